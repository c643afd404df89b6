//! Item commands for the `stockroom` CLI.
//!
//! These call the same [`service`] functions as the HTTP handlers, so the
//! normalization and filtering rules are identical. Unlike the web UI, a
//! failed write is returned as an error and ends the process non-zero.

use anyhow::{bail, Result};

use stockroom_core::models::{Item, ItemFields};
use stockroom_core::service::{self, Mutation};
use stockroom_core::store::ItemStore;

use crate::config::{Backend, Config};
use crate::{db, migrate};

/// One line per item: id, name, category, location, creation time.
pub fn format_item(item: &Item) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        item.id,
        item.name.as_deref().unwrap_or("-"),
        item.category.as_deref().unwrap_or("-"),
        item.location.as_deref().unwrap_or("-"),
        item.created_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

pub async fn run_list(config: &Config, store: &dyn ItemStore, query: Option<&str>) -> Result<()> {
    let listing =
        service::list_items(store, query, None, &config.ui.list_error_message).await;

    if let Some(error) = listing.error {
        bail!(error);
    }
    if listing.items.is_empty() {
        println!("No items.");
        return Ok(());
    }
    for item in &listing.items {
        println!("{}", format_item(item));
    }
    Ok(())
}

pub async fn run_add(store: &dyn ItemStore, fields: ItemFields) -> Result<()> {
    if let Mutation::Created(item) = service::create_item(store, fields).await? {
        println!("Created {}", format_item(&item));
    }
    Ok(())
}

pub async fn run_update(store: &dyn ItemStore, id: &str, fields: ItemFields) -> Result<()> {
    match service::update_item(store, id, fields).await? {
        Mutation::Updated {
            item: Some(item), ..
        } => println!("Updated {}", format_item(&item)),
        _ => println!("No item with id {}", id),
    }
    Ok(())
}

pub async fn run_delete(store: &dyn ItemStore, id: &str) -> Result<()> {
    service::delete_item(store, id).await?;
    println!("Deleted {}", id);
    Ok(())
}

/// Create the local SQLite schema. The hosted backends manage their own.
pub async fn run_init(config: &Config) -> Result<()> {
    match config.database.backend {
        Backend::Sqlite => {
            let pool = db::connect(&config.database.sqlite_path).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!(
                "Database initialized at {}.",
                config.database.sqlite_path.display()
            );
        }
        Backend::Postgrest => {
            println!(
                "Nothing to do: the '{}' table is managed by the hosted database.",
                config.database.table
            );
        }
        Backend::Memory => println!("Nothing to do for the in-memory backend."),
    }
    Ok(())
}
