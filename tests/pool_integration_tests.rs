//! Integration Tests for the Cache Pool
//!
//! Drives full save/commit/rollback cycles against an engine that can be
//! told to refuse writes and deletes.

use std::collections::HashSet;

use cache_pool::cache::expiry::seconds_to_interval;
use cache_pool::cache::{CacheItem, CachePool, ExpireAfter, PoolItem, TransactionState};
use cache_pool::engine::{MemoryEngine, Namespace, RawRecord, StorageEngine};
use cache_pool::{CacheError, Config, SimpleCache};
use chrono::{DateTime, Utc};

// == Helper Types ==

/// Memory engine that refuses writes for selected keys and can fail deletes.
struct FlakyEngine {
    inner: MemoryEngine<String>,
    reject_writes: HashSet<String>,
    fail_deletes: bool,
}

impl FlakyEngine {
    fn new(reject: &[&str]) -> Self {
        Self {
            inner: MemoryEngine::new(Namespace::new("integration", "flaky"), 100),
            reject_writes: reject.iter().map(|key| key.to_string()).collect(),
            fail_deletes: false,
        }
    }
}

impl StorageEngine for FlakyEngine {
    type Value = String;

    fn raw_record(&self, key: &str, auto_check_expiry: bool) -> Option<RawRecord<String>> {
        self.inner.raw_record(key, auto_check_expiry)
    }

    fn has_expired(&self, key: &str) -> bool {
        self.inner.has_expired(key)
    }

    fn has_item(&self, key: &str) -> bool {
        self.inner.has_item(key)
    }

    fn set_item(
        &mut self,
        key: &str,
        value: String,
        expires_at: Option<DateTime<Utc>>,
        expire_after: Option<&ExpireAfter>,
        overwrite: bool,
    ) -> bool {
        if self.reject_writes.contains(key) {
            return false;
        }
        self.inner
            .set_item(key, value, expires_at, expire_after, overwrite)
    }

    fn delete_item(&mut self, key: &str) -> bool {
        !self.fail_deletes && self.inner.delete_item(key)
    }

    fn delete_items(&mut self, keys: &[String]) -> bool {
        !self.fail_deletes && self.inner.delete_items(keys)
    }

    fn clear(&mut self) -> bool {
        self.inner.clear()
    }
}

/// Item type the pool did not produce.
struct ForeignItem {
    key: String,
}

impl PoolItem<String> for ForeignItem {
    fn key(&self) -> &str {
        &self.key
    }
}

// == Helper Functions ==

fn item(key: &str, value: &str) -> CacheItem<String> {
    CacheItem::new(key, Some(value.to_string()))
}

fn stage_all(pool: &mut CachePool<FlakyEngine>, keys: &[&str]) {
    for key in keys {
        assert!(pool.save_deferred(&item(key, &format!("value_{}", key))).unwrap());
    }
}

// == Commit Tests ==

#[test]
fn test_commit_failure_keeps_failed_keys_staged() {
    let mut pool = CachePool::new(FlakyEngine::new(&["key2", "key4"]));
    stage_all(&mut pool, &["key1", "key2", "key3", "key4"]);

    assert!(!pool.commit());

    assert_eq!(pool.state(), TransactionState::PartiallyFailed);
    assert_eq!(pool.deferred_keys(), vec!["key2", "key4"]);
    assert_eq!(pool.passed_keys(), ["key1", "key3"]);

    // partial application is visible in the engine
    assert!(pool.has_item("key1").unwrap());
    assert!(!pool.has_item("key2").unwrap());
    assert!(pool.has_item("key3").unwrap());
}

#[test]
fn test_rollback_removes_exactly_passed_keys() {
    let mut pool = CachePool::new(FlakyEngine::new(&["key2"]));
    assert!(pool.save(&item("keep_me", "untouched")).unwrap());
    stage_all(&mut pool, &["key1", "key2", "key3"]);

    assert!(!pool.commit());
    assert!(pool.rollback().unwrap());

    assert!(pool.passed_keys().is_empty());
    assert!(!pool.has_item("key1").unwrap());
    assert!(!pool.has_item("key3").unwrap());
    assert!(pool.has_item("keep_me").unwrap());
    assert_eq!(pool.deferred_keys(), vec!["key2"]);
}

#[test]
fn test_failed_rollback_can_be_retried() {
    let mut pool = CachePool::new(FlakyEngine::new(&["key2"]));
    stage_all(&mut pool, &["key1", "key2"]);
    assert!(!pool.commit());

    pool.engine_mut().fail_deletes = true;
    assert!(!pool.rollback().unwrap());
    assert_eq!(pool.passed_keys(), ["key1"]);
    assert!(pool.has_item("key1").unwrap());

    pool.engine_mut().fail_deletes = false;
    assert!(pool.rollback().unwrap());
    assert!(!pool.has_item("key1").unwrap());
}

#[test]
fn test_retry_commit_after_engine_recovers() {
    let mut pool = CachePool::new(FlakyEngine::new(&["key2"]));
    stage_all(&mut pool, &["key1", "key2"]);
    assert!(!pool.commit());

    pool.engine_mut().reject_writes.clear();
    assert!(pool.commit());

    assert_eq!(pool.state(), TransactionState::Idle);
    assert!(pool.has_item("key1").unwrap());
    assert!(pool.has_item("key2").unwrap());
}

#[test]
fn test_next_commit_resets_passed() {
    let mut pool = CachePool::new(FlakyEngine::new(&["key2"]));
    stage_all(&mut pool, &["key1", "key2"]);
    assert!(!pool.commit());
    assert_eq!(pool.passed_keys(), ["key1"]);

    // key2 is still refused; the new attempt writes nothing
    assert!(!pool.commit());
    assert!(pool.passed_keys().is_empty());
}

// == Save Tests ==

#[test]
fn test_save_reports_engine_refusal() {
    let mut pool = CachePool::new(FlakyEngine::new(&["blocked"]));
    assert!(!pool.save(&item("blocked", "value")).unwrap());
}

#[test]
fn test_foreign_items_are_rejected() {
    let mut pool = CachePool::new(FlakyEngine::new(&[]));
    let foreign = ForeignItem {
        key: "foreign".to_string(),
    };

    assert!(!pool.save(&foreign).unwrap());
    assert!(!pool.save_deferred(&foreign).unwrap());
    assert_eq!(pool.state(), TransactionState::Idle);
}

#[test]
fn test_expiration_round_trips_through_storage() {
    let mut pool = CachePool::new(FlakyEngine::new(&[]));
    let mut session = item("session", "data");
    session.expires_after(Some(ExpireAfter::Interval(seconds_to_interval(3600))));
    pool.save(&session).unwrap();

    let fetched = pool.get_item("session").unwrap();
    assert!(fetched.is_hit());
    assert_eq!(
        fetched.expire_after().map(ExpireAfter::as_seconds),
        Some(3600)
    );
    assert!(fetched.expiration().unwrap() > Utc::now());
}

// == Key Legality Tests ==

#[test]
fn test_illegal_keys_never_reach_engine() {
    let mut pool = CachePool::new(FlakyEngine::new(&[]));

    for key in ["", "ab", "bad key!"] {
        assert!(matches!(
            pool.get_item(key),
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(pool.get_items(&[key]).is_err());
        assert!(pool.has_item(key).is_err());
        assert!(pool.delete_item(key).is_err());
        assert!(pool.delete_items(&["abc", key]).is_err());
        assert!(pool.save_deferred(&item(key, "value")).is_err());
    }

    assert!(pool.get_item("abc").is_ok());
    assert!(pool.get_item("valid_key-1").is_ok());
}

// == Configuration Tests ==

#[test]
fn test_pools_from_config_are_isolated() {
    let config = Config::default();
    let mut first: CachePool<MemoryEngine<String>> = CachePool::from_config(&config);
    let second: CachePool<MemoryEngine<String>> = CachePool::from_config(&config);

    first.save(&item("shared", "value")).unwrap();

    assert!(first.has_item("shared").unwrap());
    assert!(!second.has_item("shared").unwrap());
}

#[test]
fn test_simple_cache_from_config() {
    let mut cache: SimpleCache<MemoryEngine<String>> = SimpleCache::from_config(&Config::default());

    assert!(cache.set("greeting", "hello".to_string(), None).unwrap());
    assert_eq!(
        cache.get("greeting", None).unwrap().as_deref(),
        Some("hello")
    );
}

