//! Storage Engine Module
//!
//! The primitives a pool consumes from its backing store, plus a bounded
//! in-memory implementation.

mod memory;
mod record;

use std::fmt;

use chrono::{DateTime, Utc};

use crate::cache::ExpireAfter;

pub use memory::MemoryEngine;
pub use record::StoredRecord;

// == Namespace ==
/// Storage name plus partition identifying one logical cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub storage: String,
    pub partition: String,
}

impl Namespace {
    pub fn new(storage: impl Into<String>, partition: impl Into<String>) -> Self {
        Self {
            storage: storage.into(),
            partition: partition.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.storage, self.partition)
    }
}

// == Raw Record ==
/// A stored record as read from the engine, expired or not.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord<V> {
    pub data: V,
    /// Seconds left until the record's deadline, None = no expiration
    pub expiration: Option<u64>,
    /// Relative descriptor the record was written with
    pub expire_after: Option<ExpireAfter>,
}

// == Storage Engine ==
/// Key/value store with its own expiration bookkeeping.
///
/// Failures are reported as `false`, never as errors.
pub trait StorageEngine {
    type Value: Clone;

    /// Reads a record. With `auto_check_expiry`, expired records read as `None`.
    fn raw_record(&self, key: &str, auto_check_expiry: bool) -> Option<RawRecord<Self::Value>>;

    /// True when the record is missing or past its deadline.
    fn has_expired(&self, key: &str) -> bool;

    /// True only for a present, unexpired record.
    fn has_item(&self, key: &str) -> bool;

    /// Persists a value. The relative expiration wins over the absolute one.
    fn set_item(
        &mut self,
        key: &str,
        value: Self::Value,
        expires_at: Option<DateTime<Utc>>,
        expire_after: Option<&ExpireAfter>,
        overwrite: bool,
    ) -> bool;

    fn delete_item(&mut self, key: &str) -> bool;

    fn delete_items(&mut self, keys: &[String]) -> bool;

    fn clear(&mut self) -> bool;

    /// Drops expired records and returns how many were removed.
    fn purge_expired(&mut self) -> usize {
        0
    }
}
