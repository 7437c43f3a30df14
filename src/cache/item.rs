//! Cache Item Module
//!
//! Defines the value object handed out by the pool for a single cache entry.

use chrono::{DateTime, Utc};

use crate::cache::ExpireAfter;

// == Pool Item Capability ==
/// Anything that can be offered to a pool's save paths.
///
/// Pools only persist the concrete [`CacheItem`] they produce. Other
/// implementations are rejected at runtime by returning `None` here.
pub trait PoolItem<V> {
    /// Key the item is stored under.
    fn key(&self) -> &str;

    /// Returns the concrete pool item, if this is one.
    fn as_cache_item(&self) -> Option<&CacheItem<V>> {
        None
    }
}

// == Cache Item ==
/// A single cache entry: key, content, hit flag and expiration.
///
/// `None` content is the miss sentinel. Not thread-safe by contract; the
/// pool owns the concurrency discipline.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheItem<V> {
    key: String,
    content: Option<V>,
    is_hit: bool,
    expiration: Option<DateTime<Utc>>,
    expire_after: Option<ExpireAfter>,
}

impl<V> CacheItem<V> {
    // == Constructors ==
    /// Creates an item whose hit flag follows from the content.
    pub fn new(key: impl Into<String>, content: Option<V>) -> Self {
        let is_hit = content.is_some();
        Self::with_hit(key, content, is_hit)
    }

    /// Creates an item with an explicit hit flag.
    pub fn with_hit(key: impl Into<String>, content: Option<V>, is_hit: bool) -> Self {
        Self {
            key: key.into(),
            content,
            is_hit,
            expiration: None,
            expire_after: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the content only when the item is a hit.
    pub fn get(&self) -> Option<&V> {
        if self.is_hit {
            self.content.as_ref()
        } else {
            None
        }
    }

    pub fn is_hit(&self) -> bool {
        self.is_hit
    }

    /// Replaces the content and recomputes the hit flag.
    pub fn set(&mut self, value: Option<V>) -> &mut Self {
        self.is_hit = value.is_some();
        self.content = value;
        self
    }

    // == Expiration ==
    /// Sets the absolute expiration and clears any relative one.
    pub fn expires_at(&mut self, expiration: Option<DateTime<Utc>>) -> &mut Self {
        self.expiration = expiration;
        self.expire_after = None;
        self
    }

    /// Sets the relative expiration.
    ///
    /// Unlike [`CacheItem::expires_at`], this leaves the absolute expiration
    /// in place; both may be set at once.
    pub fn expires_after(&mut self, time: Option<ExpireAfter>) -> &mut Self {
        self.expire_after = time;
        self
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    pub fn expire_after(&self) -> Option<&ExpireAfter> {
        self.expire_after.as_ref()
    }
}

impl<V> PoolItem<V> for CacheItem<V> {
    fn key(&self) -> &str {
        &self.key
    }

    fn as_cache_item(&self) -> Option<&CacheItem<V>> {
        Some(self)
    }
}
