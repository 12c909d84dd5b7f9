//! Plan-to-graph derivation.
//!
//! Turns a flat ordered plan into a positioned node set and a directed edge
//! set. Layout is a fixed horizontal row: deterministic and reproducible
//! without a layout solver. Prerequisite references that cannot be resolved
//! (unknown id, self-reference, duplicate pair) are dropped and counted, not
//! raised as errors; they are a data-quality issue in the upstream plan.

use std::collections::HashSet;

use crate::graph::{Graph, GraphEdge, GraphNode, NodeStatus, Position};
use crate::plan::PlanNode;

/// X coordinate of the first node.
pub const X_ORIGIN: f64 = 100.0;
/// Horizontal spacing between consecutive nodes.
pub const X_SPACING: f64 = 220.0;
/// Y coordinate of the single row.
pub const Y_ROW: f64 = 150.0;

/// Result of deriving a graph from a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub graph: Graph,
    /// Number of prerequisite references that were dropped because they
    /// pointed at an unknown node, at the node itself, or duplicated an
    /// already-emitted edge.
    pub dropped_refs: usize,
    /// Number of plan nodes that were dropped for repeating an earlier
    /// node's id. Node ids are unique in the derived graph.
    pub dropped_nodes: usize,
}

/// Derive a positioned graph from a flat plan.
///
/// - A node repeating an earlier node's id is dropped and counted; the
///   first occurrence wins.
/// - The k-th retained node (0-indexed) is placed at `x = 100 + 220k,
///   y = 150`.
/// - Every prerequisite `p` of node `n` becomes an edge `p -> n` when both
///   endpoints exist and `p != n`.
/// - If no prerequisite produces an edge and there are at least two nodes,
///   a linear chain in list order is synthesized instead, so a plan without
///   dependency data never renders as a disconnected point cloud. The
///   fallback is all-or-nothing: it never extends a partial edge set.
///
/// Pure and deterministic; an empty plan yields an empty graph.
pub fn derive_plan(plan: &[PlanNode]) -> Derivation {
    let mut node_ids: HashSet<&str> = HashSet::new();
    let mut retained: Vec<&PlanNode> = Vec::with_capacity(plan.len());
    let mut dropped_nodes = 0usize;
    for source in plan {
        if node_ids.insert(source.id.as_str()) {
            retained.push(source);
        } else {
            dropped_nodes += 1;
        }
    }

    let nodes: Vec<GraphNode> = retained
        .iter()
        .enumerate()
        .map(|(k, source)| GraphNode {
            id: source.id.clone(),
            label: source.topic.clone(),
            status: NodeStatus::Default,
            position: Position::new(X_ORIGIN + k as f64 * X_SPACING, Y_ROW),
            source_node: (*source).clone(),
        })
        .collect();

    let mut edges: Vec<GraphEdge> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut dropped_refs = 0usize;

    for node in &retained {
        for prereq in &node.prerequisites {
            let resolvable = node_ids.contains(prereq.as_str()) && *prereq != node.id;
            if !resolvable {
                dropped_refs += 1;
                continue;
            }
            let edge = GraphEdge::between(prereq.clone(), node.id.clone());
            if seen_ids.insert(edge.id.clone()) {
                edges.push(edge);
            } else {
                dropped_refs += 1;
            }
        }
    }

    if edges.is_empty() && nodes.len() > 1 {
        edges = nodes
            .windows(2)
            .map(|pair| GraphEdge::between(pair[0].id.clone(), pair[1].id.clone()))
            .collect();
    }

    Derivation {
        graph: Graph { nodes, edges },
        dropped_refs,
        dropped_nodes,
    }
}

impl Graph {
    /// Derive a graph from a plan, logging dropped nodes and references.
    pub fn from_plan(plan: &[PlanNode]) -> Self {
        let derivation = derive_plan(plan);
        if derivation.dropped_nodes > 0 {
            tracing::warn!(
                dropped = derivation.dropped_nodes,
                "plan contained duplicate node ids"
            );
        }
        if derivation.dropped_refs > 0 {
            tracing::warn!(
                dropped = derivation.dropped_refs,
                "plan contained unresolvable prerequisite references"
            );
        }
        derivation.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, topic: &str, prereqs: &[&str]) -> PlanNode {
        PlanNode {
            prerequisites: prereqs.iter().map(|p| (*p).to_owned()).collect(),
            ..PlanNode::bare(id, topic)
        }
    }

    #[test]
    fn empty_plan_yields_empty_graph() {
        let derivation = derive_plan(&[]);
        assert!(derivation.graph.is_empty());
        assert_eq!(derivation.dropped_refs, 0);
        assert_eq!(derivation.dropped_nodes, 0);
    }

    #[test]
    fn nodes_match_plan_order_and_layout() {
        let plan = vec![
            node("1", "Intro", &[]),
            node("2", "Basics", &["1"]),
            node("3", "Advanced", &["2"]),
        ];
        let graph = derive_plan(&plan).graph;

        assert_eq!(graph.nodes.len(), plan.len());
        let xs: Vec<f64> = graph.nodes.iter().map(|n| n.position.x).collect();
        assert_eq!(xs, vec![100.0, 320.0, 540.0]);
        assert!(graph.nodes.iter().all(|n| n.position.y == 150.0));
        assert!(graph.nodes.iter().all(|n| n.status == NodeStatus::Default));

        let edge_ids: Vec<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, vec!["e1-2", "e2-3"]);
    }

    #[test]
    fn labels_come_from_topics() {
        let plan = vec![node("a", "Ownership", &[])];
        let graph = derive_plan(&plan).graph;
        assert_eq!(graph.nodes[0].label, "Ownership");
        assert_eq!(graph.nodes[0].source_node.topic, "Ownership");
    }

    #[test]
    fn unknown_prerequisites_are_dropped_and_counted() {
        let plan = vec![node("a", "X", &["ghost"]), node("b", "Y", &["a"])];
        let derivation = derive_plan(&plan);

        assert_eq!(derivation.dropped_refs, 1);
        assert_eq!(derivation.graph.edges.len(), 1);
        assert_eq!(derivation.graph.edges[0].id, "ea-b");
    }

    #[test]
    fn self_references_are_dropped() {
        let plan = vec![node("a", "X", &["a"]), node("b", "Y", &["a"])];
        let derivation = derive_plan(&plan);

        assert_eq!(derivation.dropped_refs, 1);
        assert!(derivation.graph.edges.iter().all(|e| e.source != e.target));
    }

    #[test]
    fn duplicate_prerequisite_pairs_collapse_to_one_edge() {
        let plan = vec![node("a", "X", &[]), node("b", "Y", &["a", "a"])];
        let derivation = derive_plan(&plan);

        assert_eq!(derivation.graph.edges.len(), 1);
        assert_eq!(derivation.dropped_refs, 1);
    }

    #[test]
    fn duplicate_node_ids_collapse_to_first_occurrence() {
        let plan = vec![
            node("a", "Intro", &[]),
            node("a", "Intro again", &[]),
            node("b", "Basics", &["a"]),
        ];
        let derivation = derive_plan(&plan);

        assert_eq!(derivation.dropped_nodes, 1);
        assert_eq!(derivation.graph.nodes.len(), 2);
        assert_eq!(derivation.graph.nodes[0].label, "Intro");
        // Positions stay contiguous over the retained nodes.
        let xs: Vec<f64> = derivation.graph.nodes.iter().map(|n| n.position.x).collect();
        assert_eq!(xs, vec![100.0, 320.0]);
        assert_eq!(derivation.graph.edges.len(), 1);
        assert_eq!(derivation.graph.edges[0].id, "ea-b");
    }

    #[test]
    fn duplicated_single_id_never_produces_a_self_loop() {
        // Without dedup the fallback chain would link "a" to itself.
        let plan = vec![node("a", "X", &[]), node("a", "X copy", &[])];
        let derivation = derive_plan(&plan);

        assert_eq!(derivation.graph.nodes.len(), 1);
        assert!(derivation.graph.edges.is_empty());
        assert_eq!(derivation.dropped_nodes, 1);
    }

    #[test]
    fn no_dangling_edges_in_derived_graph() {
        let plan = vec![
            node("a", "X", &["missing", "b"]),
            node("b", "Y", &[]),
            node("c", "Z", &["b"]),
        ];
        let graph = derive_plan(&plan).graph;

        for edge in &graph.edges {
            assert!(graph.contains_node(&edge.source), "dangling source");
            assert!(graph.contains_node(&edge.target), "dangling target");
        }
    }

    #[test]
    fn fallback_chain_when_no_prerequisites() {
        let plan = vec![node("a", "X", &[]), node("b", "Y", &[]), node("c", "Z", &[])];
        let graph = derive_plan(&plan).graph;

        let edge_ids: Vec<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, vec!["ea-b", "eb-c"]);
    }

    #[test]
    fn fallback_triggers_when_all_prerequisites_unresolvable() {
        let plan = vec![node("a", "X", &["ghost"]), node("b", "Y", &["phantom"])];
        let derivation = derive_plan(&plan);

        assert_eq!(derivation.dropped_refs, 2);
        let edge_ids: Vec<&str> = derivation.graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, vec!["ea-b"]);
    }

    #[test]
    fn fallback_never_extends_a_partial_edge_set() {
        // One real edge exists, so the two unlinked nodes stay unlinked.
        let plan = vec![
            node("a", "W", &[]),
            node("b", "X", &["a"]),
            node("c", "Y", &[]),
            node("d", "Z", &[]),
        ];
        let graph = derive_plan(&plan).graph;
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].id, "ea-b");
    }

    #[test]
    fn single_node_gets_no_fallback_edge() {
        let plan = vec![node("only", "Solo", &[])];
        let graph = derive_plan(&plan).graph;
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn derivation_is_deterministic() {
        let plan = vec![node("1", "Intro", &[]), node("2", "Basics", &["1"])];
        assert_eq!(derive_plan(&plan), derive_plan(&plan));
    }
}
