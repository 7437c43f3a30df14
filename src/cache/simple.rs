//! Simple Cache Module
//!
//! Plain key/value access over a storage engine, without item objects.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::key::{validate_key, validate_keys};
use crate::cache::ExpireAfter;
use crate::config::Config;
use crate::engine::{MemoryEngine, StorageEngine};
use crate::error::Result;

// == Simple Cache ==
/// Key/value cache that always overwrites and falls back to a default TTL.
///
/// Values are written as given unless a blank-value check is installed with
/// [`SimpleCache::reject_blank`]; writes of values it flags are refused.
pub struct SimpleCache<E: StorageEngine> {
    engine: E,
    /// TTL in seconds for writes without an explicit one
    default_ttl: u64,
    /// Flags values that must not be stored
    blank: Option<fn(&E::Value) -> bool>,
}

impl<E: StorageEngine> SimpleCache<E> {
    // == Constructor ==
    /// Creates a cache over `engine`.
    ///
    /// # Arguments
    /// * `engine` - Storage engine the values are written to
    /// * `default_ttl` - TTL in seconds for writes without an explicit one
    pub fn new(engine: E, default_ttl: u64) -> Self {
        Self {
            engine,
            default_ttl,
            blank: None,
        }
    }

    /// Refuses writes of values for which `is_blank` returns true.
    ///
    /// # Arguments
    /// * `is_blank` - Predicate flagging values that must not be stored
    ///
    /// # Returns
    /// The cache with the check installed
    pub fn reject_blank(mut self, is_blank: fn(&E::Value) -> bool) -> Self {
        self.blank = Some(is_blank);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Get ==
    /// Returns the live value for `key`, or `default`.
    pub fn get(&self, key: &str, default: Option<E::Value>) -> Result<Option<E::Value>> {
        validate_key(key)?;
        Ok(self.read(key).or(default))
    }

    // == Set ==
    /// Stores `value`, replacing any existing record.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Relative expiration, the default TTL when None
    ///
    /// # Returns
    /// - `Ok(true)` if the value was stored
    /// - `Ok(false)` if the value is blank or the engine refused the write
    /// - `Err(CacheError::InvalidArgument)` if the key is illegal
    pub fn set(&mut self, key: &str, value: E::Value, ttl: Option<ExpireAfter>) -> Result<bool> {
        validate_key(key)?;
        Ok(self.write(key, value, ttl))
    }

    pub fn has(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.engine.has_item(key))
    }

    pub fn delete(&mut self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.engine.delete_item(key))
    }

    pub fn clear(&mut self) -> bool {
        self.engine.clear()
    }

    // == Batch Operations ==
    /// Reads every key, substituting `default` for misses.
    ///
    /// All keys are checked before anything is read.
    pub fn get_multiple<S: AsRef<str>>(
        &self,
        keys: &[S],
        default: Option<E::Value>,
    ) -> Result<HashMap<String, Option<E::Value>>> {
        validate_keys(keys)?;

        Ok(keys
            .iter()
            .map(|key| {
                let key = key.as_ref();
                (key.to_string(), self.read(key).or_else(|| default.clone()))
            })
            .collect())
    }

    /// Writes every entry. True if at least one write succeeded.
    ///
    /// All keys are checked before anything is written; writes themselves
    /// are best-effort.
    pub fn set_multiple<K: AsRef<str>>(
        &mut self,
        entries: Vec<(K, E::Value)>,
        ttl: Option<ExpireAfter>,
    ) -> Result<bool> {
        entries
            .iter()
            .try_for_each(|(key, _)| validate_key(key.as_ref()))?;

        let mut written = 0usize;
        let total = entries.len();
        for (key, value) in entries {
            if self.write(key.as_ref(), value, ttl) {
                written += 1;
            }
        }

        debug!(written, total, "set_multiple finished");
        Ok(written != 0)
    }

    pub fn delete_multiple<S: AsRef<str>>(&mut self, keys: &[S]) -> Result<bool> {
        validate_keys(keys)?;
        let keys: Vec<String> = keys.iter().map(|key| key.as_ref().to_string()).collect();
        Ok(self.engine.delete_items(&keys))
    }

    // == Helpers ==
    fn read(&self, key: &str) -> Option<E::Value> {
        self.engine.raw_record(key, true).map(|record| record.data)
    }

    fn write(&mut self, key: &str, value: E::Value, ttl: Option<ExpireAfter>) -> bool {
        if self.blank.is_some_and(|is_blank| is_blank(&value)) {
            debug!(key, "blank value refused");
            return false;
        }

        let ttl = ttl.unwrap_or(ExpireAfter::Seconds(self.default_ttl));
        self.engine.set_item(key, value, None, Some(&ttl), true)
    }
}

impl<V: Clone> SimpleCache<MemoryEngine<V>> {
    /// Creates a cache over a fresh memory engine described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            MemoryEngine::new(config.namespace(), config.max_entries),
            config.default_ttl,
        )
    }
}

// == Blank Values ==
/// Blank-value check for JSON values: null, the empty string and the empty array.
///
/// Intended for [`SimpleCache::reject_blank`].
pub fn is_blank_json(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
