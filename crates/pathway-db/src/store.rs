//! The PostgreSQL [`PlanStore`] implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use pathway_core::graph::Graph;
use pathway_core::store::{PlanDocument, PlanStore, StoredPlan};

/// Plan store over a PostgreSQL pool: one JSONB document per plan id.
#[derive(Debug, Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a plan with an empty graph document, unless it already
    /// exists. Returns whether a new row was created.
    pub async fn create_empty(&self, plan_id: &str) -> Result<bool> {
        let doc = serde_json::to_value(PlanDocument::from_graph(&Graph::empty()))
            .context("failed to encode empty plan document")?;

        let result = sqlx::query(
            "INSERT INTO plans (id, doc) VALUES ($1, $2) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(plan_id)
        .bind(doc)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to create plan {plan_id:?}"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn get(&self, plan_id: &str) -> Result<Option<StoredPlan>> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM plans WHERE id = $1")
                .bind(plan_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("failed to fetch plan {plan_id:?}"))?;

        match doc {
            Some(value) => {
                let document: PlanDocument = serde_json::from_value(value)
                    .with_context(|| format!("plan {plan_id:?} holds an unrecognizable document"))?;
                Ok(Some(document.plan))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, plan_id: &str, graph: &Graph) -> Result<()> {
        let doc = serde_json::to_value(PlanDocument::from_graph(graph))
            .context("failed to encode plan document")?;

        sqlx::query(
            "INSERT INTO plans (id, doc) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc, updated_at = now()",
        )
        .bind(plan_id)
        .bind(doc)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to save plan {plan_id:?}"))?;

        tracing::debug!(plan_id, "plan document saved");
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM plans ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .context("failed to list plan ids")?;

        Ok(ids)
    }
}
