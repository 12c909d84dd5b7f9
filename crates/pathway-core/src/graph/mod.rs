//! Graph snapshot types, derivation, and edit operations.

pub mod derive;
pub mod edit;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::PlanNode;

/// Progress marker on a graph node.
///
/// Stored documents written by older clients may carry arbitrary status
/// strings; those decode leniently to [`Self::Default`]. Operator input goes
/// through the strict [`FromStr`] impl and rejects unknown values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeStatus {
    #[default]
    Default,
    Done,
    InProgress,
    Skipped,
}

impl NodeStatus {
    /// The wire spelling. `InProgress` is stored as `"progress"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Done => "done",
            Self::InProgress => "progress",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeStatus {
    type Err = NodeStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "done" => Ok(Self::Done),
            "progress" => Ok(Self::InProgress),
            "skipped" => Ok(Self::Skipped),
            other => Err(NodeStatusParseError(other.to_owned())),
        }
    }
}

/// Lenient decode: unrecognized legacy values become `Default`.
impl From<String> for NodeStatus {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl From<NodeStatus> for String {
    fn from(status: NodeStatus) -> Self {
        status.as_str().to_owned()
    }
}

/// Error returned when parsing an invalid [`NodeStatus`] string.
#[derive(Debug, Clone, Error)]
#[error("invalid node status {0:?} (expected default, done, progress, or skipped)")]
pub struct NodeStatusParseError(pub String);

/// Canvas position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A positioned, statused node of a pathway graph.
///
/// `id` is immutable once created and unique within a graph; `label`,
/// `status`, and `position` change through the edit operations in [`edit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub status: NodeStatus,
    pub position: Position,
    /// The plan record this node was derived from. Renames propagate into
    /// its `topic` so a graph can be flattened back to a plan.
    #[serde(rename = "sourceNode")]
    pub source_node: PlanNode,
}

/// A directed edge between two graph nodes.
///
/// The id is derived from the endpoints; one edge per (source, target) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl GraphEdge {
    /// The deterministic id scheme: `e<source>-<target>`.
    pub fn derived_id(source: &str, target: &str) -> String {
        format!("e{source}-{target}")
    }

    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: Self::derived_id(&source, &target),
            source,
            target,
        }
    }
}

/// A whole graph snapshot: the unit of display, edit, and persistence.
///
/// Node order is meaningful (it is the plan order for derived graphs) and
/// preserved by every edit operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Flatten back to the plan records embedded in the nodes, in node order.
    pub fn to_plan(&self) -> Vec<PlanNode> {
        self.nodes.iter().map(|n| n.source_node.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_strictly() {
        assert_eq!("done".parse::<NodeStatus>().unwrap(), NodeStatus::Done);
        assert_eq!(
            "progress".parse::<NodeStatus>().unwrap(),
            NodeStatus::InProgress
        );
        assert!("finished".parse::<NodeStatus>().is_err());
    }

    #[test]
    fn status_decodes_leniently_from_json() {
        let status: NodeStatus = serde_json::from_str(r#""skipped""#).unwrap();
        assert_eq!(status, NodeStatus::Skipped);

        // Unknown legacy values fall back to Default rather than erroring.
        let status: NodeStatus = serde_json::from_str(r#""paused""#).unwrap();
        assert_eq!(status, NodeStatus::Default);
    }

    #[test]
    fn status_serializes_as_wire_spelling() {
        let json = serde_json::to_string(&NodeStatus::InProgress).unwrap();
        assert_eq!(json, r#""progress""#);
    }

    #[test]
    fn edge_id_is_derived_from_endpoints() {
        let edge = GraphEdge::between("a", "b");
        assert_eq!(edge.id, "ea-b");
        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
    }

    #[test]
    fn missing_status_defaults_on_decode() {
        let json = r#"{
            "id": "n1",
            "label": "Intro",
            "position": {"x": 100.0, "y": 150.0},
            "sourceNode": {"id": "n1", "topic": "Intro"}
        }"#;
        let node: GraphNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.status, NodeStatus::Default);
    }
}
