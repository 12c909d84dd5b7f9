//! Application session state.
//!
//! The session is the one explicit state struct the presentation layer
//! owns: the selected plan id, the current graph snapshot, and the chat
//! transcript. Graph mutation goes through the pure operations in
//! [`crate::graph::edit`]; the session only sequences I/O against the
//! store and backend seams. It is mutated by a single owner -- no locking.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::services::{BackendService, CHAT_ERROR_REPLY};
use crate::store::{self, PlanStore};

/// Who said a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message of the assistant conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The editable application state for one open plan.
#[derive(Debug)]
pub struct Session {
    plan_id: String,
    graph: Graph,
    transcript: Vec<ChatMessage>,
}

impl Session {
    /// A fresh session on an empty graph.
    pub fn new(plan_id: impl Into<String>) -> Self {
        Self {
            plan_id: plan_id.into(),
            graph: Graph::empty(),
            transcript: Vec::new(),
        }
    }

    /// Open a session on a stored plan. A missing document opens on an
    /// empty graph; a legacy flat-plan document is normalized on the way in.
    pub async fn load(store: &dyn PlanStore, plan_id: impl Into<String>) -> Result<Self> {
        let plan_id = plan_id.into();
        let graph = store::load_graph(store, &plan_id).await?;
        Ok(Self {
            plan_id,
            graph,
            transcript: Vec::new(),
        })
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Replace the snapshot wholesale (e.g. after loading from elsewhere).
    pub fn set_graph(&mut self, graph: Graph) {
        self.graph = graph;
    }

    /// Apply a pure snapshot transformation from [`crate::graph::edit`].
    pub fn apply<F>(&mut self, op: F)
    where
        F: FnOnce(&Graph) -> Graph,
    {
        self.graph = op(&self.graph);
    }

    /// Generate a plan for a topic and replace the current snapshot with
    /// the derived graph. On failure the old snapshot is retained.
    pub async fn generate(
        &mut self,
        backend: &dyn BackendService,
        topic: &str,
        timeframe: &str,
    ) -> Result<&Graph> {
        let plan = backend.generate_plan(topic, timeframe).await?;
        tracing::info!(topic, nodes = plan.len(), "plan generated");
        self.graph = Graph::from_plan(&plan);
        Ok(&self.graph)
    }

    /// Persist the current snapshot as a whole-document overwrite.
    pub async fn save(&self, store: &dyn PlanStore) -> Result<()> {
        store.set(&self.plan_id, &self.graph).await
    }

    /// Switch to another plan: save the current snapshot first, then load
    /// the target. The two steps are sequenced, not atomic; a missing
    /// target loads as an empty graph.
    pub async fn switch_plan(
        &mut self,
        store: &dyn PlanStore,
        new_plan_id: impl Into<String>,
    ) -> Result<()> {
        self.save(store).await?;
        let new_plan_id = new_plan_id.into();
        self.graph = store::load_graph(store, &new_plan_id).await?;
        self.plan_id = new_plan_id;
        Ok(())
    }

    /// Send one chat message and append both sides to the transcript.
    ///
    /// A service failure does not fail the conversation: a synthetic error
    /// reply is appended instead and the error is logged.
    pub async fn chat(&mut self, backend: &dyn BackendService, message: &str) -> &ChatMessage {
        self.transcript.push(ChatMessage {
            role: ChatRole::User,
            content: message.to_owned(),
        });

        let content = match backend.chat(message).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "chat service request failed");
                CHAT_ERROR_REPLY.to_owned()
            }
        };

        self.transcript.push(ChatMessage {
            role: ChatRole::Assistant,
            content,
        });
        self.transcript.last().expect("just pushed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeStatus, Position, edit};
    use crate::plan::PlanNode;
    use crate::store::MemoryPlanStore;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    /// Scripted backend: fixed plan, chat reply, and a failure switch.
    struct ScriptedBackend {
        plan: Vec<PlanNode>,
        fail: bool,
    }

    impl ScriptedBackend {
        fn with_plan(plan: Vec<PlanNode>) -> Self {
            Self { plan, fail: false }
        }

        fn failing() -> Self {
            Self {
                plan: Vec::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl BackendService for ScriptedBackend {
        async fn generate_plan(&self, _topic: &str, _timeframe: &str) -> Result<Vec<PlanNode>> {
            if self.fail {
                return Err(anyhow!("planning service unreachable"));
            }
            Ok(self.plan.clone())
        }

        async fn suggest_resources(&self, topic: &str) -> Result<Vec<String>> {
            Ok(vec![format!("{topic} handbook")])
        }

        async fn chat(&self, message: &str) -> Result<String> {
            if self.fail {
                return Err(anyhow!("chat service unreachable"));
            }
            Ok(format!("echo: {message}"))
        }

        async fn execute_code(&self, _code: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn two_step_plan() -> Vec<PlanNode> {
        vec![
            PlanNode::bare("1", "Intro"),
            PlanNode {
                prerequisites: vec!["1".to_owned()],
                ..PlanNode::bare("2", "Basics")
            },
        ]
    }

    #[tokio::test]
    async fn generate_replaces_snapshot_with_derived_graph() {
        let backend = ScriptedBackend::with_plan(two_step_plan());
        let mut session = Session::new("userPlan");

        session.generate(&backend, "rust", "3 months").await.unwrap();

        assert_eq!(session.graph().nodes.len(), 2);
        assert_eq!(session.graph().edges[0].id, "e1-2");
    }

    #[tokio::test]
    async fn failed_generate_retains_old_snapshot() {
        let good = ScriptedBackend::with_plan(two_step_plan());
        let bad = ScriptedBackend::failing();
        let mut session = Session::new("userPlan");

        session.generate(&good, "rust", "3 months").await.unwrap();
        let before = session.graph().clone();

        assert!(session.generate(&bad, "rust", "3 months").await.is_err());
        assert_eq!(session.graph(), &before);
    }

    #[tokio::test]
    async fn save_then_load_roundtrips_edits() {
        let store = MemoryPlanStore::new();
        let backend = ScriptedBackend::with_plan(two_step_plan());
        let mut session = Session::new("userPlan");
        session.generate(&backend, "rust", "3 months").await.unwrap();

        session.apply(|g| edit::set_status(g, "1", NodeStatus::Done));
        session.apply(|g| edit::move_node(g, "2", Position::new(400.0, 90.0)));
        session.save(&store).await.unwrap();

        let reopened = Session::load(&store, "userPlan").await.unwrap();
        assert_eq!(reopened.graph(), session.graph());
    }

    #[tokio::test]
    async fn switch_plan_saves_current_before_loading_target() {
        let store = MemoryPlanStore::new();
        let backend = ScriptedBackend::with_plan(two_step_plan());
        let mut session = Session::new("first");
        session.generate(&backend, "rust", "3 months").await.unwrap();
        let first_graph = session.graph().clone();

        session.switch_plan(&store, "second").await.unwrap();

        // Current graph is the (empty) target; the old one was persisted.
        assert_eq!(session.plan_id(), "second");
        assert!(session.graph().is_empty());
        let stored = store::load_graph(&store, "first").await.unwrap();
        assert_eq!(stored, first_graph);
    }

    #[tokio::test]
    async fn chat_appends_user_and_assistant_messages() {
        let backend = ScriptedBackend::with_plan(Vec::new());
        let mut session = Session::new("userPlan");

        let reply = session.chat(&backend, "hello").await;
        assert_eq!(reply.role, ChatRole::Assistant);
        assert_eq!(reply.content, "echo: hello");

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, ChatRole::User);
        assert_eq!(transcript[0].content, "hello");
    }

    #[tokio::test]
    async fn chat_failure_appends_synthetic_error_reply() {
        let backend = ScriptedBackend::failing();
        let mut session = Session::new("userPlan");

        let reply = session.chat(&backend, "hello").await;
        assert_eq!(reply.content, CHAT_ERROR_REPLY);
        assert_eq!(session.transcript().len(), 2);
    }
}
