//! Core domain logic for the pathway learning-graph engine.
//!
//! A *plan* is a flat, ordered list of topic nodes with prerequisite links,
//! produced by an external AI planning service. A *graph* is the positioned
//! node/edge structure derived from a plan; it is the unit of display, edit,
//! and persistence.
//!
//! Module layout:
//! - [`plan`]: wire types for plan nodes and learning resources.
//! - [`graph`]: graph snapshot types, derivation, and edit operations.
//! - [`store`]: the `PlanStore` document-store seam and stored-shape decoding.
//! - [`services`]: the external AI backend seam (plan/resources/chat/execute).
//! - [`session`]: the application-state struct owned by the presentation layer.

pub mod graph;
pub mod plan;
pub mod services;
pub mod session;
pub mod store;

pub use graph::{Graph, GraphEdge, GraphNode, NodeStatus, Position};
pub use plan::{PlanNode, Resource, ResourceKind};
