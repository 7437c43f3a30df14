//! Expiry Module
//!
//! Relative expiration descriptors and the pure time conversions between them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

// == Interval ==
/// A structured duration split into days, hours, minutes and seconds.
///
/// Intervals built by [`seconds_to_interval`] are normalized: hours < 24,
/// minutes < 60 and seconds < 60.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    #[serde(default)]
    pub days: u64,
    #[serde(default)]
    pub hours: u64,
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,
}

impl Interval {
    pub fn new(days: u64, hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }
}

// == Expire After ==
/// Relative expiration, given either as plain seconds or as an interval.
///
/// The descriptor is kept as given so it round-trips through the
/// engine unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpireAfter {
    Seconds(u64),
    Interval(Interval),
}

impl ExpireAfter {
    /// Total length of the descriptor in seconds.
    pub fn as_seconds(&self) -> u64 {
        match self {
            ExpireAfter::Seconds(seconds) => *seconds,
            ExpireAfter::Interval(interval) => interval_to_seconds(interval),
        }
    }

    /// Absolute deadline when counted from `now`.
    pub fn deadline_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + seconds_as_duration(self.as_seconds())
    }
}

impl From<u64> for ExpireAfter {
    fn from(seconds: u64) -> Self {
        ExpireAfter::Seconds(seconds)
    }
}

impl From<Interval> for ExpireAfter {
    fn from(interval: Interval) -> Self {
        ExpireAfter::Interval(interval)
    }
}

// == Conversions ==
/// Splits a number of seconds into a normalized interval.
pub fn seconds_to_interval(total: u64) -> Interval {
    Interval {
        days: total / SECONDS_PER_DAY,
        hours: (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
        minutes: (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
        seconds: total % SECONDS_PER_MINUTE,
    }
}

/// Total number of seconds an interval spans. Saturates instead of overflowing.
pub fn interval_to_seconds(interval: &Interval) -> u64 {
    interval
        .days
        .saturating_mul(SECONDS_PER_DAY)
        .saturating_add(interval.hours.saturating_mul(SECONDS_PER_HOUR))
        .saturating_add(interval.minutes.saturating_mul(SECONDS_PER_MINUTE))
        .saturating_add(interval.seconds)
}

/// Timestamp `seconds` from now.
pub fn seconds_to_datetime(seconds: u64) -> DateTime<Utc> {
    Utc::now() + seconds_as_duration(seconds)
}

// chrono durations are bounded; clamp absurd TTLs to roughly a century
fn seconds_as_duration(seconds: u64) -> Duration {
    const MAX_SECONDS: i64 = 100 * 365 * SECONDS_PER_DAY as i64;
    Duration::seconds(i64::try_from(seconds).map_or(MAX_SECONDS, |s| s.min(MAX_SECONDS)))
}
