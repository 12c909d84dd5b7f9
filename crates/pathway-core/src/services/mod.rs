//! External AI backend seam: plan generation, resource suggestion, chat,
//! and code execution.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;

use crate::plan::PlanNode;

pub use http::HttpBackend;

/// Reply appended to the chat transcript when the chat service fails,
/// instead of failing the conversation.
pub const CHAT_ERROR_REPLY: &str = "[Error: Could not get response from AI]";

/// The four request-response operations offered by the AI backend.
///
/// Every call is fire-and-forget request-response: no retry, no
/// cancellation. A failure surfaces as an error at the call site and must
/// leave prior state untouched.
///
/// # Object Safety
///
/// The trait is object-safe so the presentation layer can hold a
/// `dyn BackendService` and tests can substitute a mock.
#[async_trait]
pub trait BackendService: Send + Sync {
    /// Generate a flat learning plan for a topic over a timeframe
    /// (e.g. `"3 months"`). A malformed or missing plan in the response is
    /// an empty plan, not an error.
    async fn generate_plan(&self, topic: &str, timeframe: &str) -> Result<Vec<PlanNode>>;

    /// Suggest learning resources for a topic, flattened to display lines.
    async fn suggest_resources(&self, topic: &str) -> Result<Vec<String>>;

    /// Answer a single chat message.
    async fn chat(&self, message: &str) -> Result<String>;

    /// Execute a code snippet in the backend's fixed runtime and return its
    /// output (stdout, result value, or error text).
    async fn execute_code(&self, code: &str) -> Result<String>;
}

// Compile-time assertion: BackendService must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn BackendService) {}
};
