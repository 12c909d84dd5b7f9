//! HTTP implementation of [`BackendService`].
//!
//! Talks JSON to the planning backend (FastAPI in the reference deployment,
//! default `http://localhost:8000`). Response bodies are decoded with the
//! same tolerance the endpoints exhibit: a `plan` field that is missing or
//! not a valid node list is treated as an empty plan, and suggested
//! resources may arrive as strings, structured resources, or one blob of
//! text.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::plan::{PlanNode, Resource};
use crate::services::BackendService;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Per-request timeout, matching the backend's own outbound LLM timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the AI backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client for the given base URL (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("request to {url} returned an error status"))?;

        response
            .json::<R>()
            .await
            .with_context(|| format!("failed to decode response from {url}"))
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PlanRequest<'a> {
    topic: &'a str,
    timeframe: &'a str,
}

#[derive(Debug, Deserialize)]
struct PlanResponse {
    /// Kept as a raw value so a malformed plan degrades to empty instead of
    /// failing the whole request.
    #[serde(default)]
    plan: serde_json::Value,
}

impl PlanResponse {
    fn into_plan(self) -> Vec<PlanNode> {
        match serde_json::from_value::<Vec<PlanNode>>(self.plan) {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!(error = %err, "planning service returned an unusable plan field");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct TopicRequest<'a> {
    topic: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResourcesResponse {
    #[serde(default)]
    resources: ResourcesField,
}

/// The `resources` field as the service actually sends it: a list of
/// strings and/or structured resources, or a single text blob.
#[derive(Debug, Deserialize, Default)]
#[serde(untagged)]
enum ResourcesField {
    List(Vec<ResourceEntry>),
    Text(String),
    #[default]
    Missing,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResourceEntry {
    Structured(Resource),
    Text(String),
}

impl ResourcesField {
    fn into_lines(self) -> Vec<String> {
        match self {
            Self::List(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    ResourceEntry::Structured(res) => res.display_line(),
                    ResourceEntry::Text(line) => line,
                })
                .collect(),
            Self::Text(blob) => blob.lines().map(str::to_owned).collect(),
            Self::Missing => Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    output: Option<String>,
    result: Option<String>,
    error: Option<String>,
}

impl ExecuteResponse {
    fn into_output(self) -> String {
        self.output
            .or(self.result)
            .or(self.error)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait]
impl BackendService for HttpBackend {
    async fn generate_plan(&self, topic: &str, timeframe: &str) -> Result<Vec<PlanNode>> {
        let response: PlanResponse = self
            .post_json("/api/plan", &PlanRequest { topic, timeframe })
            .await?;
        Ok(response.into_plan())
    }

    async fn suggest_resources(&self, topic: &str) -> Result<Vec<String>> {
        let response: ResourcesResponse =
            self.post_json("/api/resources", &TopicRequest { topic }).await?;
        Ok(response.resources.into_lines())
    }

    async fn chat(&self, message: &str) -> Result<String> {
        let response: ChatResponse = self.post_json("/api/chat", &ChatRequest { message }).await?;
        response.response.context("chat response missing `response` field")
    }

    async fn execute_code(&self, code: &str) -> Result<String> {
        let response: ExecuteResponse = self
            .post_json("/api/execute/python", &ExecuteRequest { code })
            .await?;
        Ok(response.into_output())
    }
}
