//! Core data models used throughout Stockroom.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A stored inventory item.
///
/// `id` and `created_at` are assigned by the store on insert and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The writable fields of an item, as submitted on create and update.
///
/// Absent fields are omitted when serialized, so an update leaves the
/// corresponding column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ItemFields {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            category: Some(category.into()),
            location: Some(location.into()),
        }
    }

    /// Overwrite `item`'s writable fields with the ones present here.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = Some(name.clone());
        }
        if let Some(category) = &self.category {
            item.category = Some(category.clone());
        }
        if let Some(location) = &self.location {
            item.location = Some(location.clone());
        }
    }
}

/// Hosted tables use either `bigint` identity columns or `uuid` keys;
/// both are carried as an opaque string.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}
