//! SQLite-backed [`ItemStore`] implementation for offline development.
//!
//! Filters are translated into a `WHERE` clause whose values are always
//! bound parameters; only static column names are spliced into the SQL.
//! SQLite's `LIKE` folds ASCII case only, so case-insensitive conditions run
//! against `*_folded` columns that hold the Rust-lowercased text.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use stockroom_core::error::{StoreError, StoreResult};
use stockroom_core::models::{Item, ItemFields};
use stockroom_core::query::{Field, Filter, ListQuery, Operator, Order};
use stockroom_core::store::ItemStore;

use crate::{db, migrate};

/// SQLite implementation of the [`ItemStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `path` and make sure the schema exists.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = db::connect(path).await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

const COLUMNS: &str = "id, name, category, location, created_at";

fn db_err(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(e) => StoreError::Backend {
            message: e.message().to_string(),
            code: e.code().map(|c| c.to_string()),
        },
        other => StoreError::Transport(other.to_string()),
    }
}

fn row_to_item(row: &SqliteRow) -> StoreResult<Item> {
    let micros: i64 = row.try_get("created_at").map_err(db_err)?;
    let created_at = DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::Decode(format!("created_at out of range: {}", micros)))?;

    Ok(Item {
        id: row.try_get("id").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        category: row.try_get("category").map_err(db_err)?,
        location: row.try_get("location").map_err(db_err)?,
        created_at,
    })
}

fn fold(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::to_lowercase)
}

/// Column holding the lowercased copy of `field`, when one is kept.
fn folded_column(field: Field) -> Option<&'static str> {
    match field {
        Field::Name => Some("name_folded"),
        Field::Category => Some("category_folded"),
        _ => None,
    }
}

/// `WHERE` fragment and its bind values for `filter`.
pub fn where_clause(filter: &Filter) -> (String, Vec<String>) {
    match filter {
        Filter::AnyOf(conditions) => {
            let mut parts = Vec::with_capacity(conditions.len());
            let mut binds = Vec::with_capacity(conditions.len());
            for c in conditions {
                match c.op {
                    Operator::Eq => {
                        parts.push(format!("{} = ?", c.field.column()));
                        binds.push(c.value.clone());
                    }
                    Operator::ILike => {
                        let column = folded_column(c.field).unwrap_or(c.field.column());
                        parts.push(format!("{} LIKE ?", column));
                        binds.push(c.value.to_lowercase());
                    }
                }
            }
            (format!("({})", parts.join(" OR ")), binds)
        }
    }
}

/// `ORDER BY` fragment; ties go to the most recently inserted row.
pub fn order_clause(order: &Order) -> String {
    let direction = if order.descending { "DESC" } else { "ASC" };
    format!("{} {}, rowid DESC", order.field.column(), direction)
}

#[async_trait]
impl ItemStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn list(&self, query: &ListQuery) -> StoreResult<Vec<Item>> {
        let mut sql = format!("SELECT {} FROM items", COLUMNS);
        let mut binds = Vec::new();
        if let Some(filter) = &query.filter {
            let (clause, values) = where_clause(filter);
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
            binds = values;
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&order_clause(&query.order));

        let mut q = sqlx::query(&sql);
        for value in &binds {
            q = q.bind(value);
        }
        let rows = q.fetch_all(&self.pool).await.map_err(db_err)?;
        rows.iter().map(row_to_item).collect()
    }

    async fn insert(&self, fields: &ItemFields) -> StoreResult<Item> {
        let id = uuid::Uuid::new_v4().to_string();
        let micros = Utc::now().timestamp_micros();

        let row = sqlx::query(&format!(
            "INSERT INTO items ({}, name_folded, category_folded) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            COLUMNS, COLUMNS
        ))
        .bind(&id)
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(&fields.location)
        .bind(micros)
        .bind(fold(&fields.name))
        .bind(fold(&fields.category))
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        row_to_item(&row)
    }

    async fn update(&self, id: &str, fields: &ItemFields) -> StoreResult<Option<Item>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE items SET
                name = COALESCE(?, name),
                category = COALESCE(?, category),
                location = COALESCE(?, location),
                name_folded = COALESCE(?, name_folded),
                category_folded = COALESCE(?, category_folded)
            WHERE id = ?
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(&fields.location)
        .bind(fold(&fields.name))
        .bind(fold(&fields.category))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(row_to_item).transpose()
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
