//! The `pathway serve` command: read-only JSON API over stored plans.
//!
//! Legacy flat-plan documents are normalized on the way out, so API
//! consumers only ever see the graph shape.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use pathway_core::Graph;
use pathway_core::store::PlanStore;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PlanSummaryResponse {
    pub id: String,
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Serialize)]
pub struct PlanDetailResponse {
    pub id: String,
    pub plan: Graph,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(store: Arc<dyn PlanStore>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/plans", get(list_plans))
        .route("/api/plans/{id}", get(get_plan_detail))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(store: Arc<dyn PlanStore>, bind: &str, port: u16) -> Result<()> {
    let app = build_router(store);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("pathway serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("pathway serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(
    State(store): State<Arc<dyn PlanStore>>,
) -> Result<axum::response::Response, AppError> {
    let ids = store.list_ids().await.map_err(AppError::internal)?;

    let rows = if ids.is_empty() {
        "<tr><td>No plans found.</td></tr>".to_string()
    } else {
        ids.iter()
            .map(|id| format!("<tr><td><a href=\"/api/plans/{id}\">{id}</a></td></tr>"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let html = format!(
        "<!DOCTYPE html>\
<html><head><title>pathway</title></head><body>\
<h1>pathway</h1>\
<p><a href=\"/api/plans\">/api/plans</a></p>\
<table><tr><th>Plan</th></tr>{rows}</table>\
</body></html>"
    );

    Ok(Html(html).into_response())
}

async fn list_plans(
    State(store): State<Arc<dyn PlanStore>>,
) -> Result<axum::response::Response, AppError> {
    let ids = store.list_ids().await.map_err(AppError::internal)?;

    let mut results = Vec::with_capacity(ids.len());
    for id in ids {
        let graph = pathway_core::store::load_graph(store.as_ref(), &id)
            .await
            .map_err(AppError::internal)?;
        results.push(PlanSummaryResponse {
            id,
            nodes: graph.nodes.len(),
            edges: graph.edges.len(),
        });
    }

    Ok(Json(results).into_response())
}

async fn get_plan_detail(
    State(store): State<Arc<dyn PlanStore>>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let stored = store
        .get(&id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(format!("plan {id} not found")))?;

    Ok(Json(PlanDetailResponse {
        id,
        plan: stored.normalize(),
    })
    .into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
