//! Cache Module
//!
//! Cache items, the transactional item pool and the key/value cache.

pub mod expiry;
mod item;
pub mod key;
mod pool;
mod simple;


// Re-export public types
pub use expiry::{ExpireAfter, Interval};
pub use item::{CacheItem, PoolItem};
pub use pool::{CachePool, TransactionState};
pub use simple::{is_blank_json, SimpleCache};

// == Public Constants ==
/// Minimum accepted key length in bytes
pub const MIN_KEY_LENGTH: usize = 3;
