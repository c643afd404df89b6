//! Inventory operations behind every request handler.
//!
//! Each function takes the store explicitly and returns a typed result. The
//! transport layer (HTTP handlers, CLI) decides how to present it: a
//! rendered page, a redirect carrying the error message, or terminal
//! output. Nothing here retries; a failed store call is reported once.

use tracing::{error, info};

use crate::error::StoreError;
use crate::models::{Item, ItemFields};
use crate::normalize::normalize_field;
use crate::query::ListQuery;
use crate::store::ItemStore;

/// Message shown when a listing cannot be fetched, unless configured otherwise.
pub const DEFAULT_LIST_FAILURE_MESSAGE: &str = "Errore nella ricerca";

/// Data for the listing view.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub items: Vec<Item>,
    /// Error to display above the listing, if any.
    pub error: Option<String>,
    /// The search term as the user typed it (empty when absent).
    pub search_query: String,
}

/// Successful outcome of a write.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Created(Item),
    /// `item` is `None` when no stored item had `id`.
    Updated { id: String, item: Option<Item> },
    Deleted { id: String },
}

/// Title-case all three writable fields independently.
pub fn normalize_fields(raw: ItemFields) -> ItemFields {
    ItemFields {
        name: normalize_field(raw.name),
        category: normalize_field(raw.category),
        location: normalize_field(raw.location),
    }
}

/// Fetch the listing, newest first, narrowed by `term` when it has text.
///
/// Store failures never escape: they are logged and the listing comes back
/// empty with `failure_message` as its error.
pub async fn list_items(
    store: &dyn ItemStore,
    term: Option<&str>,
    prior_error: Option<String>,
    failure_message: &str,
) -> Listing {
    let search_query = term.unwrap_or_default().to_string();
    let query = ListQuery::search(term);

    match store.list(&query).await {
        Ok(items) => Listing {
            items,
            error: prior_error,
            search_query,
        },
        Err(e) => {
            error!(backend = store.backend(), error = %e, "listing items failed");
            Listing {
                items: Vec::new(),
                error: Some(failure_message.to_string()),
                search_query,
            }
        }
    }
}

pub async fn create_item(store: &dyn ItemStore, raw: ItemFields) -> Result<Mutation, StoreError> {
    let fields = normalize_fields(raw);
    let item = store.insert(&fields).await?;
    info!(id = %item.id, "item created");
    Ok(Mutation::Created(item))
}

pub async fn update_item(
    store: &dyn ItemStore,
    id: &str,
    raw: ItemFields,
) -> Result<Mutation, StoreError> {
    let fields = normalize_fields(raw);
    let item = store.update(id, &fields).await?;
    if item.is_none() {
        info!(id, "update matched no item");
    }
    Ok(Mutation::Updated {
        id: id.to_string(),
        item,
    })
}

pub async fn delete_item(store: &dyn ItemStore, id: &str) -> Result<Mutation, StoreError> {
    match store.delete(id).await {
        Ok(()) => {
            info!(id, "item deleted");
            Ok(Mutation::Deleted { id: id.to_string() })
        }
        Err(e) => {
            error!(backend = store.backend(), id, error = %e, "delete failed");
            Err(e)
        }
    }
}
