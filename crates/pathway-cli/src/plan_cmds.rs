//! CLI handlers for `pathway plan` subcommands.
//!
//! Implements:
//! - `pathway plan generate <topic>` -- generate a plan and store its graph
//! - `pathway plan new <plan-id>`    -- create an empty plan
//! - `pathway plan list`             -- list all stored plans
//! - `pathway plan show [plan-id]`   -- print a plan's nodes and edges

use anyhow::Result;

use pathway_core::services::HttpBackend;
use pathway_core::session::Session;
use pathway_core::store::{self, PlanStore};
use pathway_db::PgPlanStore;

use crate::PlanCommands;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(
    command: PlanCommands,
    store: &PgPlanStore,
    backend: &HttpBackend,
) -> Result<()> {
    match command {
        PlanCommands::Generate {
            topic,
            timeframe,
            plan,
        } => cmd_generate(store, backend, &topic, &timeframe, &plan).await,
        PlanCommands::New { plan_id } => cmd_new(store, &plan_id).await,
        PlanCommands::List => cmd_list(store).await,
        PlanCommands::Show { plan_id } => cmd_show(store, &plan_id).await,
    }
}

// -----------------------------------------------------------------------
// pathway plan generate <topic>
// -----------------------------------------------------------------------

/// Ask the backend for a plan, derive the graph, and overwrite the stored
/// document for the plan id.
async fn cmd_generate(
    store: &PgPlanStore,
    backend: &HttpBackend,
    topic: &str,
    timeframe: &str,
    plan_id: &str,
) -> Result<()> {
    let mut session = Session::new(plan_id);
    session.generate(backend, topic, timeframe).await?;
    session.save(store).await?;

    let graph = session.graph();
    println!(
        "Plan '{plan_id}' generated for '{topic}' ({timeframe}): {} nodes, {} edges.",
        graph.nodes.len(),
        graph.edges.len(),
    );
    for node in &graph.nodes {
        println!("  [{}] {}", node.id, node.label);
    }

    Ok(())
}

// -----------------------------------------------------------------------
// pathway plan new <plan-id>
// -----------------------------------------------------------------------

/// Create an empty plan. First write wins: an existing plan is left alone.
async fn cmd_new(store: &PgPlanStore, plan_id: &str) -> Result<()> {
    if store.create_empty(plan_id).await? {
        println!("Plan '{plan_id}' created (empty).");
    } else {
        println!("Plan '{plan_id}' already exists; left unchanged.");
    }
    Ok(())
}

// -----------------------------------------------------------------------
// pathway plan list
// -----------------------------------------------------------------------

/// List all stored plans with node and edge counts.
async fn cmd_list(store: &PgPlanStore) -> Result<()> {
    let ids = store.list_ids().await?;

    if ids.is_empty() {
        println!("No plans found. Use `pathway plan generate <topic>` to create one.");
        return Ok(());
    }

    let id_w = ids.iter().map(String::len).max().unwrap_or(4).max(4);
    println!("{:<id_w$}  NODES  EDGES", "PLAN");
    for id in &ids {
        let graph = store::load_graph(store, id).await?;
        println!(
            "{:<id_w$}  {:>5}  {:>5}",
            id,
            graph.nodes.len(),
            graph.edges.len(),
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// pathway plan show [plan-id]
// -----------------------------------------------------------------------

/// Print a plan's nodes (with status, position, and resources) and edges.
/// Missing and legacy documents are smoothed the same way every read path
/// smooths them: empty graph and derived graph respectively.
async fn cmd_show(store: &PgPlanStore, plan_id: &str) -> Result<()> {
    let graph = store::load_graph(store, plan_id).await?;

    if graph.is_empty() {
        println!("Plan '{plan_id}' is empty.");
        return Ok(());
    }

    println!("Plan '{plan_id}': {} nodes, {} edges", graph.nodes.len(), graph.edges.len());
    println!();
    println!("Nodes:");
    for node in &graph.nodes {
        println!(
            "  [{}] {} ({}) at ({}, {})",
            node.id, node.label, node.status, node.position.x, node.position.y,
        );
        for resource in &node.source_node.resources {
            println!("      - {}", resource.display_line());
        }
    }

    if !graph.edges.is_empty() {
        println!();
        println!("Edges:");
        for edge in &graph.edges {
            println!("  {} : {} -> {}", edge.id, edge.source, edge.target);
        }
    }

    Ok(())
}
