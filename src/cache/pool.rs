//! Cache Pool Module
//!
//! Item-oriented access to a storage engine, plus deferred writes that are
//! committed as a batch and can be rolled back after a partial failure.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::cache::expiry::seconds_to_datetime;
use crate::cache::key::{validate_key, validate_keys};
use crate::cache::{CacheItem, PoolItem};
use crate::config::Config;
use crate::engine::{MemoryEngine, StorageEngine};
use crate::error::Result;

// == Transaction State ==
/// Observable state of the deferred-write subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Nothing staged, nothing to roll back
    Idle,
    /// One or more items waiting for commit
    Staged,
    /// Last commit applied only part of the batch
    PartiallyFailed,
}

// == Cache Pool ==
/// Transactional cache item pool over an exclusively owned engine.
///
/// Not internally synchronized: callers sharing a pool across threads must
/// serialize `save_deferred`, `commit` and `rollback` themselves.
pub struct CachePool<E: StorageEngine> {
    /// Backing storage engine
    engine: E,
    /// Staged items by key
    deferred: HashMap<String, CacheItem<E::Value>>,
    /// Staged keys in staging order
    order: Vec<String>,
    /// Keys written by the last partially failed commit
    passed: Vec<String>,
}

impl<E: StorageEngine> CachePool<E> {
    // == Constructor ==
    /// Creates a pool that takes ownership of `engine`.
    ///
    /// # Arguments
    /// * `engine` - Storage engine backing this pool's namespace
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            deferred: HashMap::new(),
            order: Vec::new(),
            passed: Vec::new(),
        }
    }

    /// Returns the backing engine for read-only inspection.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Direct engine access. Bypasses key checks and transaction bookkeeping.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    // == Reads ==
    /// Returns the item stored under `key`, or a miss item.
    ///
    /// Expired records are still read so their content and expiration can be
    /// carried into the item; they are returned as misses.
    ///
    /// # Arguments
    /// * `key` - The key to read
    ///
    /// # Returns
    /// - `Ok(item)` with `is_hit() == true` for a live record
    /// - `Ok(item)` with `is_hit() == false` for a missing or expired record
    /// - `Err(InvalidArgument)` if the key is illegal
    pub fn get_item(&self, key: &str) -> Result<CacheItem<E::Value>> {
        validate_key(key)?;

        let Some(record) = self.engine.raw_record(key, false) else {
            return Ok(CacheItem::with_hit(key, None, false));
        };

        let is_hit = !self.engine.has_expired(key);
        let mut item = CacheItem::with_hit(key, Some(record.data), is_hit);
        item.expires_at(record.expiration.map(seconds_to_datetime));
        item.expires_after(record.expire_after);
        Ok(item)
    }

    /// Returns items for every key. Fails before reading if any key is illegal.
    ///
    /// # Arguments
    /// * `keys` - Keys to read; duplicates collapse into one map entry
    pub fn get_items<S: AsRef<str>>(
        &self,
        keys: &[S],
    ) -> Result<HashMap<String, CacheItem<E::Value>>> {
        validate_keys(keys)?;

        keys.iter()
            .map(|key| {
                let key = key.as_ref();
                self.get_item(key).map(|item| (key.to_string(), item))
            })
            .collect()
    }

    /// True if a live record exists for `key`.
    pub fn has_item(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.engine.has_item(key))
    }

    // == Deletes ==
    /// Removes the record for `key`.
    ///
    /// # Returns
    /// The engine's report; deleting an absent key succeeds.
    pub fn delete_item(&mut self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.engine.delete_item(key))
    }

    /// Removes the records for every key. Fails before deleting if any key is illegal.
    ///
    /// # Arguments
    /// * `keys` - Keys to remove
    pub fn delete_items<S: AsRef<str>>(&mut self, keys: &[S]) -> Result<bool> {
        validate_keys(keys)?;
        let keys: Vec<String> = keys.iter().map(|key| key.as_ref().to_string()).collect();
        Ok(self.engine.delete_items(&keys))
    }

    /// Purges every record in the namespace.
    pub fn clear(&mut self) -> bool {
        self.engine.clear()
    }

    // == Save ==
    /// Writes an item immediately.
    ///
    /// Only missing or expired records are written. Saving over a live
    /// record is a no-op that reports success and keeps the stored value and
    /// expiration.
    ///
    /// # Arguments
    /// * `item` - Item to persist; only items produced as [`CacheItem`] are accepted
    ///
    /// # Returns
    /// - `Ok(true)` if written, or skipped over a live record
    /// - `Ok(false)` for foreign item types, miss content and engine refusals
    /// - `Err(InvalidArgument)` if the item key is illegal
    pub fn save(&mut self, item: &dyn PoolItem<E::Value>) -> Result<bool> {
        let Some(item) = item.as_cache_item() else {
            warn!(key = item.key(), "save rejected: not a pool item");
            return Ok(false);
        };
        validate_key(item.key())?;

        let expired = item.get().is_none() || self.engine.has_expired(item.key());
        if !expired {
            debug!(key = item.key(), "save skipped: live record present");
        }
        Ok(self.save_item(item, expired))
    }

    // == Save Deferred ==
    /// Stages a copy of the item for the next commit.
    ///
    /// Returns `Ok(false)` if the key is already staged, the item is a miss,
    /// or the engine holds a stale record for the key. Never touches the
    /// engine's contents.
    ///
    /// # Arguments
    /// * `item` - Item to stage; a copy is kept, later mutations are not seen
    pub fn save_deferred(&mut self, item: &dyn PoolItem<E::Value>) -> Result<bool> {
        let Some(item) = item.as_cache_item() else {
            warn!(key = item.key(), "deferred save rejected: not a pool item");
            return Ok(false);
        };
        let key = item.key();
        validate_key(key)?;

        if self.deferred.contains_key(key) {
            debug!(key, "deferred save rejected: key already staged");
            return Ok(false);
        }
        if item.get().is_none() {
            debug!(key, "deferred save rejected: miss content");
            return Ok(false);
        }
        if self.holds_stale_record(key) {
            debug!(key, "deferred save rejected: stored record expired");
            return Ok(false);
        }

        self.deferred.insert(key.to_string(), item.clone());
        self.order.push(key.to_string());
        debug!(key, staged = self.deferred.len(), "item staged");
        Ok(true)
    }

    // == Commit ==
    /// Writes every staged item, in staging order.
    ///
    /// Not atomic across keys. On partial failure the failed items stay
    /// staged for a retry and the written keys are kept for [`CachePool::rollback`].
    ///
    /// # Returns
    /// - `true` if every staged item was written (or nothing was staged)
    /// - `false` if at least one write was refused
    pub fn commit(&mut self) -> bool {
        if self.deferred.is_empty() {
            return true;
        }

        self.passed.clear();
        let mut staged = std::mem::take(&mut self.deferred);
        let order = std::mem::take(&mut self.order);

        for key in order {
            let Some(item) = staged.remove(&key) else {
                continue;
            };
            if self.save_item(&item, true) {
                self.passed.push(key);
            } else {
                self.deferred.insert(key.clone(), item);
                self.order.push(key);
            }
        }

        if self.deferred.is_empty() {
            info!(written = self.passed.len(), "commit complete");
            self.passed.clear();
            return true;
        }

        warn!(
            written = self.passed.len(),
            failed = self.deferred.len(),
            "commit partially failed"
        );
        false
    }

    // == Rollback ==
    /// Deletes the keys written by the last partially failed commit.
    ///
    /// Rolled back items are not re-staged. On engine failure the keys are
    /// kept so the rollback can be retried.
    ///
    /// # Returns
    /// - `Ok(true)` if the keys were removed, or there was nothing to undo
    /// - `Ok(false)` if the engine refused the delete
    pub fn rollback(&mut self) -> Result<bool> {
        if self.passed.is_empty() {
            return Ok(true);
        }

        let passed = std::mem::take(&mut self.passed);
        match self.delete_items(&passed) {
            Ok(true) => {
                info!(removed = passed.len(), "rollback complete");
                Ok(true)
            }
            outcome => {
                warn!(keys = passed.len(), "rollback failed");
                self.passed = passed;
                outcome
            }
        }
    }

    // == Inspection ==
    /// Returns where the deferred-write subsystem currently stands.
    pub fn state(&self) -> TransactionState {
        if !self.passed.is_empty() {
            TransactionState::PartiallyFailed
        } else if !self.deferred.is_empty() {
            TransactionState::Staged
        } else {
            TransactionState::Idle
        }
    }

    /// Keys currently staged, in staging order.
    pub fn deferred_keys(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Staged item for `key`, if any.
    pub fn deferred_item(&self, key: &str) -> Option<&CacheItem<E::Value>> {
        self.deferred.get(key)
    }

    /// Keys written by the last partially failed commit.
    pub fn passed_keys(&self) -> &[String] {
        &self.passed
    }

    // == Helpers ==
    fn holds_stale_record(&self, key: &str) -> bool {
        self.engine.raw_record(key, false).is_some() && self.engine.has_expired(key)
    }

    fn save_item(&mut self, item: &CacheItem<E::Value>, expired: bool) -> bool {
        if !expired {
            return true;
        }

        match item.get() {
            Some(value) => self.engine.set_item(
                item.key(),
                value.clone(),
                item.expiration(),
                item.expire_after(),
                true,
            ),
            None => false,
        }
    }
}

impl<V: Clone> CachePool<MemoryEngine<V>> {
    /// Creates a pool over a fresh memory engine described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(MemoryEngine::new(config.namespace(), config.max_entries))
    }
}

impl<E: StorageEngine> Drop for CachePool<E> {
    fn drop(&mut self) {
        if !self.deferred.is_empty() {
            warn!(
                discarded = self.deferred.len(),
                "pool dropped with uncommitted deferred items"
            );
        }
    }
}
