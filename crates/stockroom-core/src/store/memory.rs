//! In-memory [`ItemStore`] implementation for tests and local demos.
//!
//! Items live in a `Vec` behind `std::sync::RwLock`, newest insert first.
//! Filters are evaluated in process with [`Filter::matches`](crate::query::Filter::matches).

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{StoreError, StoreResult};
use crate::models::{Item, ItemFields};
use crate::query::ListQuery;

use super::ItemStore;

/// In-memory store. Ids are random UUIDs.
pub struct InMemoryStore {
    items: RwLock<Vec<Item>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// Build a store pre-populated with `items`, given oldest first.
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut stored: Vec<Item> = items.into_iter().collect();
        stored.reverse();
        Self {
            items: RwLock::new(stored),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Transport("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl ItemStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, query: &ListQuery) -> StoreResult<Vec<Item>> {
        let items = self.items.read().map_err(|_| poisoned())?;
        let mut result: Vec<Item> = items
            .iter()
            .filter(|item| query.filter.as_ref().map_or(true, |f| f.matches(item)))
            .cloned()
            .collect();
        result.sort_by(|a, b| query.order.compare(a, b));
        Ok(result)
    }

    async fn insert(&self, fields: &ItemFields) -> StoreResult<Item> {
        let item = Item {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name.clone(),
            category: fields.category.clone(),
            location: fields.location.clone(),
            created_at: Utc::now(),
        };
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.insert(0, item.clone());
        Ok(item)
    }

    async fn update(&self, id: &str, fields: &ItemFields) -> StoreResult<Option<Item>> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        Ok(items.iter_mut().find(|item| item.id == id).map(|item| {
            fields.apply_to(item);
            item.clone()
        }))
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.retain(|item| item.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn seeded() -> InMemoryStore {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let rows = [
            ("Sencha", "Tea", "Pantry"),
            ("Oolong Tea", "Drinks", "Pantry"),
            ("Mug", "Kitchen", "Tea House"),
        ];
        InMemoryStore::with_items(rows.iter().enumerate().map(|(i, (n, c, l))| Item {
            id: format!("id-{}", i),
            name: Some(n.to_string()),
            category: Some(c.to_string()),
            location: Some(l.to_string()),
            created_at: base + Duration::minutes(i as i64),
        }))
    }

    fn names(items: &[Item]) -> Vec<&str> {
        items.iter().filter_map(|i| i.name.as_deref()).collect()
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = seeded();
        let items = store.list(&ListQuery::all()).await.unwrap();
        assert_eq!(names(&items), vec!["Mug", "Oolong Tea", "Sencha"]);
    }

    #[tokio::test]
    async fn test_list_with_search() {
        let store = seeded();
        let items = store.list(&ListQuery::search(Some("TEA"))).await.unwrap();
        assert_eq!(names(&items), vec!["Oolong Tea", "Sencha"]);
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_lists_first() {
        let store = seeded();
        let item = store
            .insert(&ItemFields::new("Milk", "Dairy", "Fridge A"))
            .await
            .unwrap();
        assert!(!item.id.is_empty());
        let items = store.list(&ListQuery::all()).await.unwrap();
        assert_eq!(items[0].id, item.id);
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_created_at() {
        let store = seeded();
        let before = store.list(&ListQuery::all()).await.unwrap()[0].clone();
        let updated = store
            .update(&before.id, &ItemFields::new("Cup", "Kitchen", "Shelf"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, before.id);
        assert_eq!(updated.created_at, before.created_at);
        assert_eq!(updated.name.as_deref(), Some("Cup"));
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = seeded();
        let result = store
            .update("missing", &ItemFields::new("a", "b", "c"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_existing_and_unknown() {
        let store = seeded();
        store.delete("id-1").await.unwrap();
        store.delete("id-1").await.unwrap();
        let items = store.list(&ListQuery::all()).await.unwrap();
        assert_eq!(names(&items), vec!["Mug", "Sencha"]);
    }
}
