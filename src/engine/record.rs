//! Stored Record Module
//!
//! Defines the structure kept by the memory engine for each key.

use chrono::{DateTime, Utc};

use crate::cache::ExpireAfter;

// == Stored Record ==
/// A stored value together with its expiration metadata.
#[derive(Debug, Clone)]
pub struct StoredRecord<V> {
    /// The stored value
    pub value: V,
    /// Write timestamp
    pub created_at: DateTime<Utc>,
    /// Absolute deadline, None = no expiration
    pub deadline: Option<DateTime<Utc>>,
    /// Relative descriptor the deadline was derived from, if any
    pub expire_after: Option<ExpireAfter>,
}

impl<V> StoredRecord<V> {
    // == Constructor ==
    /// Creates a record. The relative expiration wins over the absolute one.
    pub fn new(
        value: V,
        expires_at: Option<DateTime<Utc>>,
        expire_after: Option<ExpireAfter>,
    ) -> Self {
        let now = Utc::now();
        let deadline = match &expire_after {
            Some(after) => Some(after.deadline_from(now)),
            None => expires_at,
        };

        Self {
            value,
            created_at: now,
            deadline,
            expire_after,
        }
    }

    // == Is Expired ==
    /// Checks if the record has expired.
    ///
    /// A record is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining lifetime in seconds, or None without a deadline.
    ///
    /// Partial seconds round up, so a live record never reports zero.
    ///
    /// # Returns
    /// - `Some(0)` if the record has expired
    /// - `Some(remaining_seconds)` if the record has a deadline ahead
    /// - `None` if the record never expires
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.deadline.map(|deadline| {
            let left_ms = (deadline - Utc::now()).num_milliseconds();
            u64::try_from(left_ms).map_or(0, |ms| (ms + 999) / 1000)
        })
    }
}
