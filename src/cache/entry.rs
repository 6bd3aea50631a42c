//! Cache entry with TTL support

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A cached value together with its creation time and time-to-live
///
/// Expiry is never scheduled. It is checked lazily on read and eagerly by
/// sweeps, against whatever clock the owning cache uses.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value, never inspected by the cache
    pub value: V,

    /// When the entry was stored
    pub created_at: DateTime<Utc>,

    /// How long the entry stays valid after `created_at`
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Create a new entry stored at `created_at`
    pub fn new(value: V, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value,
            created_at,
            ttl,
        }
    }

    /// Age of the entry at `now`
    ///
    /// A `now` earlier than `created_at` (clock stepped backwards) is age zero.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.created_at)
            .to_std()
            .unwrap_or(Duration::from_secs(0))
    }

    /// Check if the entry has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.age_at(now) > self.ttl
    }

    /// Time left before expiry, or `None` once expired
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.ttl.checked_sub(self.age_at(now))
    }
}
