//! Memory Engine Module
//!
//! Bounded in-process storage engine with per-record deadlines.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{Namespace, RawRecord, StorageEngine, StoredRecord};
use crate::cache::ExpireAfter;

// == Memory Engine ==
/// HashMap-backed engine bound to one namespace.
///
/// New keys are refused once `max_entries` live records are stored; there
/// is no eviction.
#[derive(Debug)]
pub struct MemoryEngine<V> {
    /// Namespace the records belong to
    namespace: Namespace,
    /// Key-record storage
    records: HashMap<String, StoredRecord<V>>,
    /// Maximum number of records allowed
    max_entries: usize,
}

impl<V> MemoryEngine<V> {
    // == Constructor ==
    /// Creates an empty engine for `namespace` holding at most `max_entries` records.
    ///
    /// # Arguments
    /// * `namespace` - Storage name and partition the records belong to
    /// * `max_entries` - Maximum number of records the engine can hold
    pub fn new(namespace: Namespace, max_entries: usize) -> Self {
        Self {
            namespace,
            records: HashMap::new(),
            max_entries,
        }
    }

    /// Returns the namespace this engine serves.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns the configured record capacity.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Returns the stored record, expired or not.
    pub fn record(&self, key: &str) -> Option<&StoredRecord<V>> {
        self.records.get(key)
    }

    // == Length ==
    /// Returns the number of stored records, including expired ones.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn live(&self, key: &str) -> Option<&StoredRecord<V>> {
        self.records.get(key).filter(|record| !record.is_expired())
    }
}

impl<V: Clone> StorageEngine for MemoryEngine<V> {
    type Value = V;

    fn raw_record(&self, key: &str, auto_check_expiry: bool) -> Option<RawRecord<V>> {
        let record = if auto_check_expiry {
            self.live(key)?
        } else {
            self.records.get(key)?
        };

        Some(RawRecord {
            data: record.value.clone(),
            expiration: record.ttl_remaining(),
            expire_after: record.expire_after,
        })
    }

    fn has_expired(&self, key: &str) -> bool {
        self.live(key).is_none()
    }

    fn has_item(&self, key: &str) -> bool {
        self.live(key).is_some()
    }

    // == Set ==
    /// Stores a record.
    ///
    /// Without `overwrite`, a live record for the key is kept and the write
    /// is refused. A new key on a full engine first purges expired records;
    /// if it is still full the write is refused.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `expires_at` - Absolute deadline, used when `expire_after` is None
    /// * `expire_after` - Relative expiration counted from now
    /// * `overwrite` - Whether a live record may be replaced
    ///
    /// # Returns
    /// - `true` if the record was stored
    /// - `false` if a live record was kept or the engine is full
    fn set_item(
        &mut self,
        key: &str,
        value: V,
        expires_at: Option<DateTime<Utc>>,
        expire_after: Option<&ExpireAfter>,
        overwrite: bool,
    ) -> bool {
        if !overwrite && self.live(key).is_some() {
            debug!(namespace = %self.namespace, key, "live record kept, overwrite disabled");
            return false;
        }

        if !self.records.contains_key(key) && self.records.len() >= self.max_entries {
            self.purge_expired();
            if self.records.len() >= self.max_entries {
                warn!(
                    namespace = %self.namespace,
                    key,
                    max_entries = self.max_entries,
                    "engine full, write refused"
                );
                return false;
            }
        }

        let record = StoredRecord::new(value, expires_at, expire_after.copied());
        self.records.insert(key.to_string(), record);
        true
    }

    // == Delete ==
    fn delete_item(&mut self, key: &str) -> bool {
        self.records.remove(key);
        true
    }

    fn delete_items(&mut self, keys: &[String]) -> bool {
        for key in keys {
            self.records.remove(key);
        }
        true
    }

    fn clear(&mut self) -> bool {
        self.records.clear();
        true
    }

    // == Purge Expired ==
    fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired_at(now));
        let removed = before - self.records.len();

        if removed > 0 {
            debug!(namespace = %self.namespace, removed, "purged expired records");
        }
        removed
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn engine(max_entries: usize) -> MemoryEngine<String> {
        MemoryEngine::new(Namespace::new("test_storage", "unit"), max_entries)
    }

    fn past() -> Option<DateTime<Utc>> {
        Some(Utc::now() - Duration::seconds(5))
    }

    #[test]
    fn test_engine_new() {
        let engine = engine(10);
        assert!(engine.is_empty());
        assert_eq!(engine.max_entries(), 10);
        assert_eq!(engine.namespace().to_string(), "test_storage/unit");
    }

    #[test]
    fn test_set_and_read() {
        let mut engine = engine(10);

        assert!(engine.set_item("key1", "value1".to_string(), None, None, true));
        let record = engine.raw_record("key1", true).unwrap();

        assert_eq!(record.data, "value1");
        assert!(record.expiration.is_none());
        assert!(engine.has_item("key1"));
        assert!(!engine.has_expired("key1"));
    }

    #[test]
    fn test_missing_key_counts_as_expired() {
        let engine = engine(10);

        assert!(engine.has_expired("missing"));
        assert!(!engine.has_item("missing"));
        assert!(engine.raw_record("missing", false).is_none());
    }

    #[test]
    fn test_expired_record_raw_read() {
        let mut engine = engine(10);
        engine.set_item("old", "value".to_string(), past(), None, true);

        assert!(engine.raw_record("old", true).is_none());
        let raw = engine.raw_record("old", false).unwrap();
        assert_eq!(raw.data, "value");
        assert_eq!(raw.expiration, Some(0));
        assert!(engine.has_expired("old"));
        assert!(!engine.has_item("old"));
    }

    #[test]
    fn test_relative_expiration_round_trips() {
        let mut engine = engine(10);
        let after = ExpireAfter::Seconds(120);
        engine.set_item("ttl", "value".to_string(), None, Some(&after), true);

        let raw = engine.raw_record("ttl", true).unwrap();
        assert_eq!(raw.expire_after, Some(after));
        assert!(raw.expiration.unwrap() >= 119);
    }

    #[test]
    fn test_no_overwrite_keeps_live_record() {
        let mut engine = engine(10);
        engine.set_item("key1", "first".to_string(), None, None, true);

        assert!(!engine.set_item("key1", "second".to_string(), None, None, false));
        assert_eq!(engine.raw_record("key1", true).unwrap().data, "first");
    }

    #[test]
    fn test_no_overwrite_replaces_expired_record() {
        let mut engine = engine(10);
        engine.set_item("key1", "first".to_string(), past(), None, true);

        assert!(engine.set_item("key1", "second".to_string(), None, None, false));
        assert_eq!(engine.raw_record("key1", true).unwrap().data, "second");
    }

    #[test]
    fn test_full_engine_refuses_new_keys() {
        let mut engine = engine(2);
        engine.set_item("key1", "a".to_string(), None, None, true);
        engine.set_item("key2", "b".to_string(), None, None, true);

        assert!(!engine.set_item("key3", "c".to_string(), None, None, true));
        assert_eq!(engine.len(), 2);

        // existing keys can still be replaced
        assert!(engine.set_item("key1", "z".to_string(), None, None, true));
    }

    #[test]
    fn test_full_engine_purges_expired_first() {
        let mut engine = engine(2);
        engine.set_item("key1", "a".to_string(), past(), None, true);
        engine.set_item("key2", "b".to_string(), None, None, true);

        assert!(engine.set_item("key3", "c".to_string(), None, None, true));
        assert!(engine.record("key1").is_none());
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut engine = engine(10);
        engine.set_item("key1", "a".to_string(), None, None, true);

        assert!(engine.delete_item("key1"));
        assert!(engine.delete_item("key1"));
        assert!(engine.delete_items(&["key1".to_string(), "nope".to_string()]));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut engine = engine(10);
        engine.set_item("key1", "a".to_string(), None, None, true);
        engine.set_item("key2", "b".to_string(), None, None, true);

        assert!(engine.clear());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let mut engine = engine(10);
        engine.set_item("old", "a".to_string(), past(), None, true);
        engine.set_item("new", "b".to_string(), None, None, true);

        assert_eq!(engine.purge_expired(), 1);
        assert_eq!(engine.len(), 1);
        assert!(engine.has_item("new"));
    }
}
