//! Schema for the local SQLite store.
//!
//! `name_folded` and `category_folded` hold the Unicode-lowercased text that
//! searches match against, since SQLite's `LIKE` folds ASCII only.

use anyhow::Result;
use sqlx::SqlitePool;

/// Create the `items` table and its index. Safe to run repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // created_at holds microseconds since the Unix epoch
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            name TEXT,
            category TEXT,
            location TEXT,
            created_at INTEGER NOT NULL,
            name_folded TEXT,
            category_folded TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_created_at ON items(created_at DESC)")
        .execute(pool)
        .await?;

    Ok(())
}
