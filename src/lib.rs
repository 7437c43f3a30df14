//! Cache Pool - transactional cache items over a storage engine
//!
//! Provides TTL-aware cache items, deferred writes committed as a batch with
//! rollback of partial failures, and a plain key/value cache.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod models;

pub use cache::{CacheItem, CachePool, SimpleCache};
pub use config::Config;
pub use error::{CacheError, Result};
