//! Storage abstraction for Stockroom.
//!
//! The [`ItemStore`] trait is the repository contract every handler works
//! against, enabling pluggable backends (hosted PostgREST, SQLite,
//! in-memory). A store is constructed once by the process entry point and
//! shared as `Arc<dyn ItemStore>`.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{Item, ItemFields};
use crate::query::ListQuery;

/// Abstract item repository.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list`](ItemStore::list) | Fetch items matching a [`ListQuery`], in its order |
/// | [`insert`](ItemStore::insert) | Create an item; the store assigns `id` and `created_at` |
/// | [`update`](ItemStore::update) | Overwrite the writable fields of one item |
/// | [`delete`](ItemStore::delete) | Remove one item permanently |
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Short backend name used in logs (`"postgrest"`, `"sqlite"`, …).
    fn backend(&self) -> &'static str;

    async fn list(&self, query: &ListQuery) -> StoreResult<Vec<Item>>;

    /// Insert a new item and return it as stored.
    async fn insert(&self, fields: &ItemFields) -> StoreResult<Item>;

    /// Update the item with the given `id`.
    ///
    /// Returns `Ok(None)` when no item has that id.
    async fn update(&self, id: &str, fields: &ItemFields) -> StoreResult<Option<Item>>;

    /// Delete the item with the given `id`. Deleting an unknown id is a no-op.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}
