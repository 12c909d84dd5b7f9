mod config;
mod edit_cmds;
mod plan_cmds;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pathway_core::services::{BackendService, HttpBackend};
use pathway_core::session::Session;
use pathway_db::{PgPlanStore, pool};

use config::PathwayConfig;

/// Plan id used when none is given on the command line.
const DEFAULT_PLAN_ID: &str = "userPlan";

#[derive(Parser)]
#[command(name = "pathway", about = "Learning pathway graph builder")]
struct Cli {
    /// Database URL (overrides PATHWAY_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// AI backend base URL (overrides PATHWAY_BACKEND_URL env var)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a pathway config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/pathway")]
        db_url: String,
        /// AI backend base URL
        #[arg(long, default_value = "http://localhost:8000")]
        backend: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the pathway database (requires config file or env vars)
    DbInit,
    /// Plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Node edit operations on a stored plan
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },
    /// Edge edit operations on a stored plan
    Edge {
        #[command(subcommand)]
        command: EdgeCommands,
    },
    /// Ask the backend for learning resource suggestions
    Resources {
        /// Topic to suggest resources for
        topic: String,
    },
    /// Send one message to the AI assistant
    Chat {
        /// Message to send
        message: String,
    },
    /// Execute a Python file through the backend sandbox
    Run {
        /// Path to the Python file
        file: String,
    },
    /// Serve plans over HTTP (JSON API)
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Generate a learning plan for a topic and store its graph
    Generate {
        /// Topic to learn
        topic: String,
        /// Timeframe the plan should fit
        #[arg(long, default_value = "3 months")]
        timeframe: String,
        /// Plan id to store the graph under
        #[arg(long, default_value = DEFAULT_PLAN_ID)]
        plan: String,
    },
    /// Create a new empty plan
    New {
        /// Plan id to create
        plan_id: String,
    },
    /// List all stored plans
    List,
    /// Show a plan's nodes and edges
    Show {
        /// Plan id to show
        #[arg(default_value = DEFAULT_PLAN_ID)]
        plan_id: String,
    },
}

#[derive(Subcommand)]
pub enum NodeCommands {
    /// Add a node with a fresh id
    Add {
        /// Node label (topic)
        label: String,
        /// Plan id to edit
        #[arg(long, default_value = DEFAULT_PLAN_ID)]
        plan: String,
        /// Resource line, repeatable ("Title - url" or bare url)
        #[arg(long = "resource")]
        resources: Vec<String>,
        /// X position (defaults to one column right of the last node)
        #[arg(long)]
        x: Option<f64>,
        /// Y position
        #[arg(long)]
        y: Option<f64>,
    },
    /// Delete a node and every edge touching it
    Delete {
        /// Node id to delete
        node_id: String,
        /// Plan id to edit
        #[arg(long, default_value = DEFAULT_PLAN_ID)]
        plan: String,
    },
    /// Move a node to a new position
    Move {
        /// Node id to move
        node_id: String,
        /// New X position
        x: f64,
        /// New Y position
        y: f64,
        /// Plan id to edit
        #[arg(long, default_value = DEFAULT_PLAN_ID)]
        plan: String,
    },
    /// Rename a node
    Rename {
        /// Node id to rename
        node_id: String,
        /// New label
        label: String,
        /// Plan id to edit
        #[arg(long, default_value = DEFAULT_PLAN_ID)]
        plan: String,
    },
    /// Set a node's status: default, done, progress, or skipped
    Status {
        /// Node id to update
        node_id: String,
        /// New status
        status: String,
        /// Plan id to edit
        #[arg(long, default_value = DEFAULT_PLAN_ID)]
        plan: String,
    },
}

#[derive(Subcommand)]
pub enum EdgeCommands {
    /// Add an edge between two existing nodes
    Add {
        /// Source node id
        source: String,
        /// Target node id
        target: String,
        /// Plan id to edit
        #[arg(long, default_value = DEFAULT_PLAN_ID)]
        plan: String,
    },
    /// Delete an edge by id (e.g. e1-2)
    Delete {
        /// Edge id to delete
        edge_id: String,
        /// Plan id to edit
        #[arg(long, default_value = DEFAULT_PLAN_ID)]
        plan: String,
    },
}

/// Execute the `pathway init` command: write config file.
fn cmd_init(db_url: &str, backend_url: &str, force: bool) -> Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        backend: config::BackendSection {
            url: backend_url.to_string(),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  backend.url  = {backend_url}");
    println!();
    println!("Next: run `pathway db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `pathway db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> Result<()> {
    let resolved = PathwayConfig::resolve(cli_db_url, None)?;

    println!("Initializing pathway database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run migrations.
    pool::run_migrations(&db_pool).await?;

    // 4. Print success with table counts.
    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    // 5. Clean shutdown.
    db_pool.close().await;

    println!("pathway db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            backend,
            force,
        } => {
            cmd_init(&db_url, &backend, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Plan { command } => {
            let resolved =
                PathwayConfig::resolve(cli.database_url.as_deref(), cli.backend_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let store = PgPlanStore::new(db_pool.clone());
            let backend = HttpBackend::new(&resolved.backend_url)?;
            let result = plan_cmds::run_plan_command(command, &store, &backend).await;
            db_pool.close().await;
            result?;
        }
        Commands::Node { command } => {
            let resolved =
                PathwayConfig::resolve(cli.database_url.as_deref(), cli.backend_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let store = PgPlanStore::new(db_pool.clone());
            let result = edit_cmds::run_node_command(command, &store).await;
            db_pool.close().await;
            result?;
        }
        Commands::Edge { command } => {
            let resolved =
                PathwayConfig::resolve(cli.database_url.as_deref(), cli.backend_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let store = PgPlanStore::new(db_pool.clone());
            let result = edit_cmds::run_edge_command(command, &store).await;
            db_pool.close().await;
            result?;
        }
        Commands::Resources { topic } => {
            let resolved =
                PathwayConfig::resolve(cli.database_url.as_deref(), cli.backend_url.as_deref())?;
            let backend = HttpBackend::new(&resolved.backend_url)?;
            let suggestions = backend.suggest_resources(&topic).await?;
            if suggestions.is_empty() {
                println!("No resources suggested for '{topic}'.");
            } else {
                for line in &suggestions {
                    println!("{line}");
                }
            }
        }
        Commands::Chat { message } => {
            let resolved =
                PathwayConfig::resolve(cli.database_url.as_deref(), cli.backend_url.as_deref())?;
            let backend = HttpBackend::new(&resolved.backend_url)?;
            let mut session = Session::new(DEFAULT_PLAN_ID);
            let reply = session.chat(&backend, &message).await;
            println!("{}", reply.content);
        }
        Commands::Run { file } => {
            let resolved =
                PathwayConfig::resolve(cli.database_url.as_deref(), cli.backend_url.as_deref())?;
            let backend = HttpBackend::new(&resolved.backend_url)?;
            let code = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read file: {file}"))?;
            let output = backend.execute_code(&code).await?;
            print!("{output}");
            if !output.ends_with('\n') {
                println!();
            }
        }
        Commands::Serve { bind, port } => {
            let resolved =
                PathwayConfig::resolve(cli.database_url.as_deref(), cli.backend_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let store = std::sync::Arc::new(PgPlanStore::new(db_pool.clone()));
            let result = serve_cmd::run_serve(store, &bind, port).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
