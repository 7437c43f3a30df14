//! Request DTOs for the loader
//!
//! Defines the structure of the JSON document read from stdin.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{CacheItem, ExpireAfter};

/// A batch of entries to stage and commit together.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadRequest {
    pub items: Vec<LoadEntry>,
}

/// One entry of a load request
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store
/// - `expires_after`: Optional relative expiration
#[derive(Debug, Clone, Deserialize)]
pub struct LoadEntry {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional relative expiration
    #[serde(default)]
    pub expires_after: Option<ExpireAfter>,
}

impl LoadEntry {
    /// Builds the cache item for this entry. JSON `null` becomes a miss.
    pub fn into_item(self) -> CacheItem<Value> {
        let content = match self.value {
            Value::Null => None,
            value => Some(value),
        };
        let mut item = CacheItem::new(self.key, content);
        item.expires_after(self.expires_after);
        item
    }
}
