//! Error types for the cache pool
//!
//! Provides unified error handling using thiserror.
//!
//! Only precondition violations are errors. Rejected writes are reported
//! as `Ok(false)` by the write paths.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Illegal cache key (empty, bad characters, too short)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration values that cannot back a pool
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache pool.
pub type Result<T> = std::result::Result<T, CacheError>;
