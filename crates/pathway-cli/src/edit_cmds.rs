//! CLI handlers for `pathway node` and `pathway edge` subcommands.
//!
//! Each handler is the same load/edit/save sequence: read the stored graph,
//! apply one pure operation from `pathway_core::graph::edit`, and persist
//! the result as a whole-document overwrite. Operations that the edit layer
//! rejects as no-ops leave the store untouched and say so.

use anyhow::{Context, Result};

use pathway_core::graph::derive::{X_ORIGIN, X_SPACING, Y_ROW};
use pathway_core::graph::{Graph, GraphEdge, NodeStatus, Position, edit};
use pathway_core::store::{self, PlanStore};
use pathway_db::PgPlanStore;

use crate::{EdgeCommands, NodeCommands};

// -----------------------------------------------------------------------
// Public entry points
// -----------------------------------------------------------------------

/// Dispatch a `NodeCommands` variant to the appropriate handler.
pub async fn run_node_command(command: NodeCommands, store: &PgPlanStore) -> Result<()> {
    match command {
        NodeCommands::Add {
            label,
            plan,
            resources,
            x,
            y,
        } => cmd_node_add(store, &plan, &label, &resources, x, y).await,
        NodeCommands::Delete { node_id, plan } => cmd_node_delete(store, &plan, &node_id).await,
        NodeCommands::Move {
            node_id,
            x,
            y,
            plan,
        } => cmd_node_move(store, &plan, &node_id, x, y).await,
        NodeCommands::Rename {
            node_id,
            label,
            plan,
        } => cmd_node_rename(store, &plan, &node_id, &label).await,
        NodeCommands::Status {
            node_id,
            status,
            plan,
        } => cmd_node_status(store, &plan, &node_id, &status).await,
    }
}

/// Dispatch an `EdgeCommands` variant to the appropriate handler.
pub async fn run_edge_command(command: EdgeCommands, store: &PgPlanStore) -> Result<()> {
    match command {
        EdgeCommands::Add {
            source,
            target,
            plan,
        } => cmd_edge_add(store, &plan, &source, &target).await,
        EdgeCommands::Delete { edge_id, plan } => cmd_edge_delete(store, &plan, &edge_id).await,
    }
}

// -----------------------------------------------------------------------
// Node commands
// -----------------------------------------------------------------------

async fn cmd_node_add(
    store: &PgPlanStore,
    plan_id: &str,
    label: &str,
    resources: &[String],
    x: Option<f64>,
    y: Option<f64>,
) -> Result<()> {
    let graph = store::load_graph(store, plan_id).await?;

    // Default placement continues the derivation row: one column to the
    // right of the last node.
    let position = Position::new(
        x.unwrap_or_else(|| X_ORIGIN + X_SPACING * graph.nodes.len() as f64),
        y.unwrap_or(Y_ROW),
    );
    let resources_text = resources.join("\n");

    let edited = edit::add_node(&graph, label, &resources_text, position);
    if edited == graph {
        println!("No change: node label must not be blank.");
        return Ok(());
    }

    store.set(plan_id, &edited).await?;
    let added = edited.nodes.last().context("node was just added")?;
    println!(
        "Node [{}] '{}' added to plan '{plan_id}' at ({}, {}).",
        added.id, added.label, added.position.x, added.position.y,
    );
    Ok(())
}

async fn cmd_node_delete(store: &PgPlanStore, plan_id: &str, node_id: &str) -> Result<()> {
    let graph = store::load_graph(store, plan_id).await?;
    let edited = edit::delete_node(&graph, node_id);
    if edited == graph {
        println!("No change: node '{node_id}' not found in plan '{plan_id}'.");
        return Ok(());
    }

    let removed_edges = graph.edges.len() - edited.edges.len();
    store.set(plan_id, &edited).await?;
    println!("Node '{node_id}' deleted from plan '{plan_id}' ({removed_edges} edges removed).");
    Ok(())
}

async fn cmd_node_move(
    store: &PgPlanStore,
    plan_id: &str,
    node_id: &str,
    x: f64,
    y: f64,
) -> Result<()> {
    let graph = store::load_graph(store, plan_id).await?;
    anyhow::ensure!(
        graph.contains_node(node_id),
        "node '{node_id}' not found in plan '{plan_id}'"
    );

    let edited = edit::move_node(&graph, node_id, Position::new(x, y));
    store.set(plan_id, &edited).await?;
    println!("Node '{node_id}' moved to ({x}, {y}).");
    Ok(())
}

async fn cmd_node_rename(
    store: &PgPlanStore,
    plan_id: &str,
    node_id: &str,
    label: &str,
) -> Result<()> {
    let graph = store::load_graph(store, plan_id).await?;
    anyhow::ensure!(
        graph.contains_node(node_id),
        "node '{node_id}' not found in plan '{plan_id}'"
    );

    let edited = edit::rename_node(&graph, node_id, label);
    store.set(plan_id, &edited).await?;
    println!("Node '{node_id}' renamed to '{label}'.");
    Ok(())
}

async fn cmd_node_status(
    store: &PgPlanStore,
    plan_id: &str,
    node_id: &str,
    status: &str,
) -> Result<()> {
    // Operator input is parsed strictly; only stored documents get the
    // lenient fallback-to-default treatment.
    let status: NodeStatus = status
        .parse()
        .with_context(|| format!("invalid status: {status}"))?;

    let graph = store::load_graph(store, plan_id).await?;
    anyhow::ensure!(
        graph.contains_node(node_id),
        "node '{node_id}' not found in plan '{plan_id}'"
    );

    let edited = edit::set_status(&graph, node_id, status);
    store.set(plan_id, &edited).await?;
    println!("Node '{node_id}' status set to '{status}'.");
    Ok(())
}

// -----------------------------------------------------------------------
// Edge commands
// -----------------------------------------------------------------------

async fn cmd_edge_add(
    store: &PgPlanStore,
    plan_id: &str,
    source: &str,
    target: &str,
) -> Result<()> {
    let graph = store::load_graph(store, plan_id).await?;
    let edited = edit::add_edge(&graph, source, target);
    if edited == graph {
        println!(
            "No change: edge rejected (unknown endpoint, self-loop, or the pair already has one)."
        );
        return Ok(());
    }

    store.set(plan_id, &edited).await?;
    println!(
        "Edge {} added to plan '{plan_id}'.",
        GraphEdge::derived_id(source, target)
    );
    Ok(())
}

async fn cmd_edge_delete(store: &PgPlanStore, plan_id: &str, edge_id: &str) -> Result<()> {
    let graph: Graph = store::load_graph(store, plan_id).await?;
    let edited = edit::delete_edge(&graph, edge_id);
    if edited == graph {
        println!("No change: edge '{edge_id}' not found in plan '{plan_id}'.");
        return Ok(());
    }

    store.set(plan_id, &edited).await?;
    println!("Edge '{edge_id}' deleted from plan '{plan_id}'.");
    Ok(())
}
