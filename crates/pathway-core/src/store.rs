//! The `PlanStore` seam -- the keyed document store holding one graph
//! snapshot per plan id.
//!
//! The store is an external collaborator: saves are opaque whole-document
//! overwrites and the last save wins. Documents written by older clients may
//! hold a raw flat plan instead of a graph; that legacy shape is detected at
//! decode time and normalized through derivation before anything else sees
//! it, so the rest of the system only ever handles the canonical [`Graph`].

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::plan::PlanNode;

/// The shape found under the `plan` key of a stored document.
///
/// Decoding is untagged: an object with `nodes` and `edges` is a graph,
/// a plain sequence is a legacy flat plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredPlan {
    Graph(Graph),
    Legacy(Vec<PlanNode>),
}

impl StoredPlan {
    /// Normalize to the canonical graph shape. Legacy flat plans go through
    /// derivation; graphs pass through unchanged.
    pub fn normalize(self) -> Graph {
        match self {
            Self::Graph(graph) => graph,
            Self::Legacy(plan) => {
                tracing::debug!(nodes = plan.len(), "normalizing legacy flat plan");
                Graph::from_plan(&plan)
            }
        }
    }
}

/// The stored document wrapper: `{ "plan": <graph or legacy plan> }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDocument {
    pub plan: StoredPlan,
}

impl PlanDocument {
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            plan: StoredPlan::Graph(graph.clone()),
        }
    }
}

/// Keyed document store for plan graphs.
///
/// Object-safe so the presentation layer can hold a `dyn PlanStore` without
/// caring which backing store is wired in.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Fetch the stored document for a plan id, if any.
    async fn get(&self, plan_id: &str) -> Result<Option<StoredPlan>>;

    /// Overwrite the stored document for a plan id with the given snapshot.
    async fn set(&self, plan_id: &str, graph: &Graph) -> Result<()>;

    /// All known plan ids.
    async fn list_ids(&self) -> Result<Vec<String>>;
}

// Compile-time assertion: PlanStore must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanStore) {}
};

/// Load a plan's graph, normalizing legacy documents. A missing document
/// yields an empty graph rather than an error.
pub async fn load_graph(store: &dyn PlanStore, plan_id: &str) -> Result<Graph> {
    let graph = match store.get(plan_id).await? {
        Some(stored) => stored.normalize(),
        None => Graph::empty(),
    };
    Ok(graph)
}

/// In-memory [`PlanStore`] backed by a hash map.
///
/// Used by unit tests and anywhere a throwaway store is convenient; the
/// production store lives in `pathway-db`.
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    docs: std::sync::Mutex<std::collections::HashMap<String, serde_json::Value>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw document, bypassing the canonical write path. Useful for
    /// planting legacy-shaped documents in tests.
    pub fn seed(&self, plan_id: &str, doc: serde_json::Value) {
        self.docs
            .lock()
            .expect("store mutex poisoned")
            .insert(plan_id.to_owned(), doc);
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn get(&self, plan_id: &str) -> Result<Option<StoredPlan>> {
        let doc = self
            .docs
            .lock()
            .expect("store mutex poisoned")
            .get(plan_id)
            .cloned();
        match doc {
            Some(value) => {
                let document: PlanDocument = serde_json::from_value(value)?;
                Ok(Some(document.plan))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, plan_id: &str, graph: &Graph) -> Result<()> {
        let value = serde_json::to_value(PlanDocument::from_graph(graph))?;
        self.docs
            .lock()
            .expect("store mutex poisoned")
            .insert(plan_id.to_owned(), value);
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .docs
            .lock()
            .expect("store mutex poisoned")
            .keys()
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }
}
