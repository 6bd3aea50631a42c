//! Bounded cache store with TTL expiry and LRU eviction

use crate::cache::{
    clock::{Clock, SystemClock},
    entry::CacheEntry,
    types::{hit_rate_percent, CacheStats},
};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Thread-safe, capacity- and TTL-bounded key/value store
///
/// This implementation provides:
/// - One mutex per instance covering entries and counters, so every
///   operation is atomic with respect to every other
/// - Lazy TTL expiry on read, eager expiry through [`BoundedCache::sweep_expired`]
/// - Exactly one LRU eviction for each `set` that overflows capacity
///
/// Values are stored as given and handed back as clones; the cache never
/// looks inside them.
pub struct BoundedCache<V> {
    /// Label used in log lines
    name: String,

    /// Capacity
    max_size: NonZeroUsize,

    /// Time source for expiry checks
    clock: Arc<dyn Clock>,

    /// Entries and counters
    inner: Mutex<CacheInner<V>>,
}

/// State guarded by the cache mutex
struct CacheInner<V> {
    /// Entries in recency order (least recently used first)
    entries: LruCache<String, CacheEntry<V>>,

    hits: u64,
    misses: u64,
    capacity_evictions: u64,
    expired_on_read: u64,
    swept: u64,
}

impl<V> CacheInner<V> {
    fn new(max_size: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(max_size),
            hits: 0,
            misses: 0,
            capacity_evictions: 0,
            expired_on_read: 0,
            swept: 0,
        }
    }
}

impl<V: Clone> BoundedCache<V> {
    /// Create a new cache using the system clock
    pub fn new(name: impl Into<String>, max_size: NonZeroUsize) -> Self {
        Self::with_clock(name, max_size, Arc::new(SystemClock))
    }

    /// Create a new cache with an injected clock
    pub fn with_clock(name: impl Into<String>, max_size: NonZeroUsize, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            max_size,
            clock,
            inner: Mutex::new(CacheInner::new(max_size)),
        }
    }

    /// Get a value from the cache
    ///
    /// A live entry becomes most recently used and counts as a hit. An
    /// expired entry is removed and counts as both an eviction and a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let now = self.clock.now();

        let expired = match inner.entries.peek(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                inner.misses += 1;
                trace!("Cache miss [{}]: {}", self.name, key);
                return None;
            }
        };

        if expired {
            inner.entries.pop(key);
            inner.expired_on_read += 1;
            inner.misses += 1;
            debug!("Cache entry expired [{}]: {}", self.name, key);
            return None;
        }

        inner.hits += 1;
        trace!("Cache hit [{}]: {}", self.name, key);
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Put a value in the cache as the most recently used entry
    ///
    /// An existing entry for `key` is replaced. If the cache is over capacity
    /// afterwards, the least recently used entry is evicted, whether or not
    /// it has expired.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let entry = CacheEntry::new(value, self.clock.now(), ttl);

        inner.entries.pop(&key);
        if let Some((evicted_key, _)) = inner.entries.push(key, entry) {
            inner.capacity_evictions += 1;
            debug!("Evicted cache key [{}]: {}", self.name, evicted_key);
        }
    }

    /// Remove an entry, returning whether one was present
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.inner.lock().entries.pop(key).is_some();
        if removed {
            debug!("Removed cache entry [{}]: {}", self.name, key);
        }
        removed
    }

    /// Remove every entry and reset all counters
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        *inner = CacheInner::new(self.max_size);
    }

    /// Remove all expired entries, returning how many were removed
    ///
    /// Removals are tallied in the `swept` counter only.
    pub fn sweep_expired(&self) -> usize {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let now = self.clock.now();

        let expired_keys: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            inner.entries.pop(key);
        }
        inner.swept += expired_keys.len() as u64;

        if !expired_keys.is_empty() {
            debug!(
                "Cleaned up {} expired cache entries [{}]",
                expired_keys.len(),
                self.name
            );
        }

        expired_keys.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();

        CacheStats {
            size: inner.entries.len(),
            max_size: self.max_size.get(),
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.capacity_evictions + inner.expired_on_read,
            capacity_evictions: inner.capacity_evictions,
            expired_on_read: inner.expired_on_read,
            swept: inner.swept,
            hit_rate_percent: hit_rate_percent(inner.hits, inner.misses),
            total_requests: inner.hits + inner.misses,
        }
    }

    /// Check if a live entry exists, without touching recency or counters
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.inner
            .lock()
            .entries
            .peek(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    /// Time left before `key` expires, without touching recency or counters
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.inner
            .lock()
            .entries
            .peek(key)
            .and_then(|entry| entry.remaining_at(now))
    }

    /// Number of stored entries, expired ones included until removed
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Capacity of the cache
    pub fn max_size(&self) -> usize {
        self.max_size.get()
    }

    /// Label used in log lines
    pub fn name(&self) -> &str {
        &self.name
    }
}
