//! Store construction.
//!
//! The entry point calls [`open_store`] once and hands the resulting
//! `Arc<dyn ItemStore>` to the server or CLI commands.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use stockroom_core::store::memory::InMemoryStore;
use stockroom_core::store::ItemStore;

use crate::config::{Backend, Config};
use crate::postgrest_store::PostgrestStore;
use crate::sqlite_store::SqliteStore;

/// Build the store selected by `database.backend`.
pub async fn open_store(config: &Config) -> Result<Arc<dyn ItemStore>> {
    let db = &config.database;
    let store: Arc<dyn ItemStore> = match db.backend {
        Backend::Postgrest => {
            let store = PostgrestStore::from_config(db)?;
            info!(endpoint = store.endpoint(), schema = %db.schema, "using postgrest store");
            Arc::new(store)
        }
        Backend::Sqlite => {
            let store = SqliteStore::open(&db.sqlite_path).await?;
            info!(path = %db.sqlite_path.display(), "using sqlite store");
            Arc::new(store)
        }
        Backend::Memory => {
            info!("using in-memory store; items are lost on exit");
            Arc::new(InMemoryStore::new())
        }
    };
    Ok(store)
}
