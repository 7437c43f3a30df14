//! Key Legality Module
//!
//! Cache keys are checked before any engine call is made.

use crate::cache::MIN_KEY_LENGTH;
use crate::error::{CacheError, Result};

/// Checks that a key is non-empty, uses only `[A-Za-z0-9_-]` and is longer
/// than two characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidArgument(
            "Cache key must be a valid string".to_string(),
        ));
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(CacheError::InvalidArgument(format!(
            "Cache key '{}' contains invalid characters",
            key
        )));
    }

    if key.len() < MIN_KEY_LENGTH {
        return Err(CacheError::InvalidArgument(format!(
            "Cache key '{}' is not long enough",
            key
        )));
    }

    Ok(())
}

/// Checks every key, stopping at the first illegal one.
pub fn validate_keys<S: AsRef<str>>(keys: &[S]) -> Result<()> {
    keys.iter().try_for_each(|key| validate_key(key.as_ref()))
}
