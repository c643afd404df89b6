//! # Stockroom CLI (`stockroom`)
//!
//! Runs the inventory web server and offers the same item operations from
//! the terminal.
//!
//! ## Usage
//!
//! ```bash
//! stockroom --config ./config/stockroom.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `stockroom serve` | Start the HTTP server |
//! | `stockroom init` | Create the local SQLite schema (sqlite backend only) |
//! | `stockroom list [--query <q>]` | List items, newest first |
//! | `stockroom add --name … --category … --location …` | Create an item |
//! | `stockroom update <id> [--name …]` | Update an item |
//! | `stockroom delete <id>` | Delete an item |
//!
//! The hosted database is selected with `SUPABASE_URL` and `SUPABASE_KEY`,
//! read from the environment or a `.env` file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stockroom::backend::open_store;
use stockroom::config;
use stockroom::{commands, server, telemetry};
use stockroom_core::models::ItemFields;

/// Stockroom: a small inventory web application.
#[derive(Parser)]
#[command(name = "stockroom", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional; when the file does not exist only defaults and environment
    /// variables are used.
    #[arg(long, global = true, default_value = "./config/stockroom.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Writable item fields as CLI flags.
#[derive(clap::Args)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    location: Option<String>,
}

impl From<FieldArgs> for ItemFields {
    fn from(args: FieldArgs) -> Self {
        ItemFields {
            name: args.name,
            category: args.category,
            location: args.location,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` (or `STOCKROOM_BIND`).
    Serve,

    /// Initialize the local database schema.
    ///
    /// Only the sqlite backend keeps its own schema; for the hosted
    /// backend this is a no-op. Idempotent.
    Init,

    /// List items, newest first.
    List {
        /// Only items whose name or category contains this text.
        #[arg(long, short)]
        query: Option<String>,
    },

    /// Create an item. Fields are title-cased before storage.
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Update an item's fields. Omitted fields are left unchanged.
    Update {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete an item.
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is not an error
    dotenvy::dotenv().ok();

    let cfg = config::load_config(&cli.config)?;
    telemetry::init_tracing(&cfg.log)?;

    match cli.command {
        Commands::Init => commands::run_init(&cfg).await?,
        Commands::Serve => server::run_server(&cfg, open_store(&cfg).await?).await?,
        Commands::List { query } => {
            let store = open_store(&cfg).await?;
            commands::run_list(&cfg, store.as_ref(), query.as_deref()).await?
        }
        Commands::Add { fields } => {
            let store = open_store(&cfg).await?;
            commands::run_add(store.as_ref(), fields.into()).await?
        }
        Commands::Update { id, fields } => {
            let store = open_store(&cfg).await?;
            commands::run_update(store.as_ref(), &id, fields.into()).await?
        }
        Commands::Delete { id } => {
            let store = open_store(&cfg).await?;
            commands::run_delete(store.as_ref(), &id).await?
        }
    }

    Ok(())
}
