//! Configuration Module
//!
//! Handles loading and managing pool configuration from environment variables.

use std::env;

use crate::engine::Namespace;
use crate::error::{CacheError, Result};

/// Pool configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage name distinguishing cache pools
    pub storage: String,
    /// Partition (subfolder) inside the storage
    pub partition: String,
    /// Maximum number of records the engine can hold
    pub max_entries: usize,
    /// Default TTL in seconds for key/value writes without explicit TTL
    pub default_ttl: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_STORAGE` - Storage name (default: psr_cache_storage)
    /// - `CACHE_PARTITION` - Partition name (default: psr)
    /// - `MAX_ENTRIES` - Maximum engine records (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 86400)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage: env::var("CACHE_STORAGE").unwrap_or(defaults.storage),
            partition: env::var("CACHE_PARTITION").unwrap_or(defaults.partition),
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_entries),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl),
        }
    }

    // == Validate ==
    /// Rejects configurations that cannot back a pool.
    pub fn validate(&self) -> Result<()> {
        if self.storage.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "storage name cannot be empty".to_string(),
            ));
        }
        if self.partition.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "partition name cannot be empty".to_string(),
            ));
        }
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig(
                "max_entries must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the namespace this configuration addresses.
    pub fn namespace(&self) -> Namespace {
        Namespace::new(self.storage.clone(), self.partition.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: "psr_cache_storage".to_string(),
            partition: "psr".to_string(),
            max_entries: 1000,
            default_ttl: 24 * 60 * 60,
        }
    }
}
