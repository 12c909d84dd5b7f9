//! Graph edit operations.
//!
//! Each operation is a pure snapshot transformation: it takes a graph by
//! reference and returns the edited copy, never touching persistence. The
//! presentation layer applies these while edit mode is active and saves the
//! final snapshot as a whole.
//!
//! Invalid inputs (blank labels, unknown ids, self-loops, duplicate edges)
//! are no-ops rather than errors; the returned graph is then an unchanged
//! clone.

use chrono::Utc;

use crate::graph::{Graph, GraphEdge, GraphNode, NodeStatus, Position};
use crate::plan::{PlanNode, Resource};

/// Append a new node with the given label and position.
///
/// The resources text is split one item per line; blank lines are skipped.
/// A blank or whitespace-only label is a no-op. The new node gets a fresh
/// time-based id, `Default` status, and no edges.
pub fn add_node(graph: &Graph, label: &str, resources_text: &str, position: Position) -> Graph {
    let label = label.trim();
    if label.is_empty() {
        return graph.clone();
    }

    let id = next_node_id(graph);
    let resources: Vec<Resource> = resources_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Resource::from_line)
        .collect();

    let source_node = PlanNode {
        resources,
        ..PlanNode::bare(id.clone(), label)
    };

    let mut next = graph.clone();
    next.nodes.push(GraphNode {
        id,
        label: label.to_owned(),
        status: NodeStatus::Default,
        position,
        source_node,
    });
    next
}

/// Remove a node and every edge touching it. Unknown ids are a no-op, so
/// the operation is idempotent.
pub fn delete_node(graph: &Graph, node_id: &str) -> Graph {
    let mut next = graph.clone();
    next.nodes.retain(|n| n.id != node_id);
    next.edges
        .retain(|e| e.source != node_id && e.target != node_id);
    next
}

/// Append an edge `source -> target` with the derived id scheme.
///
/// Unknown endpoints, self-loops, and pairs that already have an edge are
/// rejected as no-ops; the derived-id scheme cannot represent parallel
/// edges, so duplicates would otherwise silently shadow each other.
pub fn add_edge(graph: &Graph, source: &str, target: &str) -> Graph {
    if source == target || !graph.contains_node(source) || !graph.contains_node(target) {
        return graph.clone();
    }
    let id = GraphEdge::derived_id(source, target);
    if graph.edge(&id).is_some() {
        return graph.clone();
    }

    let mut next = graph.clone();
    next.edges.push(GraphEdge::between(source, target));
    next
}

/// Remove the edge with the given id. No-op if absent.
pub fn delete_edge(graph: &Graph, edge_id: &str) -> Graph {
    let mut next = graph.clone();
    next.edges.retain(|e| e.id != edge_id);
    next
}

/// Replace a node's position only.
pub fn move_node(graph: &Graph, node_id: &str, position: Position) -> Graph {
    let mut next = graph.clone();
    if let Some(node) = next.nodes.iter_mut().find(|n| n.id == node_id) {
        node.position = position;
    }
    next
}

/// Update a node's label, propagating the new label into the embedded
/// source record's topic so the graph flattens back to a consistent plan.
pub fn rename_node(graph: &Graph, node_id: &str, label: &str) -> Graph {
    let mut next = graph.clone();
    if let Some(node) = next.nodes.iter_mut().find(|n| n.id == node_id) {
        node.label = label.to_owned();
        node.source_node.topic = label.to_owned();
    }
    next
}

/// Update a node's status only. Last write wins.
pub fn set_status(graph: &Graph, node_id: &str, status: NodeStatus) -> Graph {
    let mut next = graph.clone();
    if let Some(node) = next.nodes.iter_mut().find(|n| n.id == node_id) {
        node.status = status;
    }
    next
}

/// Generate a unique time-based node id: the current millisecond timestamp,
/// bumped until it does not collide with an existing node.
fn next_node_id(graph: &Graph) -> String {
    let mut candidate = Utc::now().timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !graph.contains_node(&id) {
            return id;
        }
        candidate += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::derive::derive_plan;

    fn sample_graph() -> Graph {
        let plan = vec![
            PlanNode {
                prerequisites: vec![],
                ..PlanNode::bare("a", "Intro")
            },
            PlanNode {
                prerequisites: vec!["a".to_owned()],
                ..PlanNode::bare("b", "Basics")
            },
            PlanNode {
                prerequisites: vec!["b".to_owned()],
                ..PlanNode::bare("c", "Advanced")
            },
        ];
        derive_plan(&plan).graph
    }

    #[test]
    fn add_node_appends_with_default_status_and_no_edges() {
        let graph = sample_graph();
        let edited = add_node(&graph, "New Topic", "", Position::new(10.0, 20.0));

        assert_eq!(edited.nodes.len(), graph.nodes.len() + 1);
        assert_eq!(edited.edges.len(), graph.edges.len());

        let added = edited.nodes.last().unwrap();
        assert_eq!(added.label, "New Topic");
        assert_eq!(added.status, NodeStatus::Default);
        assert_eq!(added.position, Position::new(10.0, 20.0));
        assert!(!graph.contains_node(&added.id));
    }

    #[test]
    fn add_node_splits_resources_per_line() {
        let graph = Graph::empty();
        let text = "https://youtu.be/abc\n\n  https://example.com/notes.pdf  \n";
        let edited = add_node(&graph, "Topic", text, Position::default());

        let resources = &edited.nodes[0].source_node.resources;
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].url, "https://youtu.be/abc");
        assert_eq!(resources[1].url, "https://example.com/notes.pdf");
    }

    #[test]
    fn add_node_with_blank_label_is_a_noop() {
        let graph = sample_graph();
        assert_eq!(add_node(&graph, "   ", "", Position::default()), graph);
        assert_eq!(add_node(&graph, "", "", Position::default()), graph);
    }

    #[test]
    fn delete_node_removes_node_and_incident_edges() {
        let graph = sample_graph();
        let edited = delete_node(&graph, "b");

        assert!(!edited.contains_node("b"));
        assert!(edited.contains_node("a"));
        assert!(edited.contains_node("c"));
        assert!(
            edited
                .edges
                .iter()
                .all(|e| e.source != "b" && e.target != "b")
        );
        assert!(edited.edges.is_empty());
    }

    #[test]
    fn delete_node_is_idempotent() {
        let graph = sample_graph();
        let once = delete_node(&graph, "b");
        let twice = delete_node(&once, "b");
        assert_eq!(once, twice);
    }

    #[test]
    fn add_edge_uses_derived_id() {
        let graph = sample_graph();
        let edited = add_edge(&graph, "a", "c");
        assert!(edited.edge("ea-c").is_some());
        assert_eq!(edited.edges.len(), graph.edges.len() + 1);
    }

    #[test]
    fn add_edge_rejects_self_loops_and_unknown_endpoints() {
        let graph = sample_graph();
        assert_eq!(add_edge(&graph, "a", "a"), graph);
        assert_eq!(add_edge(&graph, "a", "ghost"), graph);
        assert_eq!(add_edge(&graph, "ghost", "a"), graph);
    }

    #[test]
    fn add_edge_rejects_duplicate_pairs() {
        let graph = sample_graph();
        // ea-b already exists from derivation.
        assert_eq!(add_edge(&graph, "a", "b"), graph);
    }

    #[test]
    fn delete_edge_removes_only_that_edge() {
        let graph = sample_graph();
        let edited = delete_edge(&graph, "ea-b");
        assert!(edited.edge("ea-b").is_none());
        assert!(edited.edge("eb-c").is_some());

        // Unknown edge id is a no-op.
        assert_eq!(delete_edge(&graph, "ex-y"), graph);
    }

    #[test]
    fn move_node_changes_position_only() {
        let graph = sample_graph();
        let edited = move_node(&graph, "a", Position::new(5.0, 7.0));

        let moved = edited.node("a").unwrap();
        assert_eq!(moved.position, Position::new(5.0, 7.0));
        assert_eq!(moved.label, graph.node("a").unwrap().label);
        assert_eq!(edited.edges, graph.edges);
    }

    #[test]
    fn rename_node_propagates_into_source_topic() {
        let graph = sample_graph();
        let edited = rename_node(&graph, "a", "Foundations");

        let renamed = edited.node("a").unwrap();
        assert_eq!(renamed.label, "Foundations");
        assert_eq!(renamed.source_node.topic, "Foundations");
    }

    #[test]
    fn set_status_last_write_wins() {
        let graph = sample_graph();
        let edited = set_status(&graph, "a", NodeStatus::Done);
        let edited = set_status(&edited, "a", NodeStatus::Skipped);

        assert_eq!(edited.node("a").unwrap().status, NodeStatus::Skipped);
        // Other nodes untouched.
        assert_eq!(edited.node("b").unwrap().status, NodeStatus::Default);
    }

    #[test]
    fn operations_do_not_mutate_the_input() {
        let graph = sample_graph();
        let snapshot = graph.clone();
        let _ = delete_node(&graph, "a");
        let _ = set_status(&graph, "b", NodeStatus::Done);
        assert_eq!(graph, snapshot);
    }
}
