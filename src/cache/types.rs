//! Core type definitions for the cache system

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Embedding vector stored in the embedding cache
pub type Embedding = Vec<f32>;

/// Entries removed per category by one sweep
pub type SweepReport = BTreeMap<CacheCategory, usize>;

/// Logical data category, one bounded cache each
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    /// Full-text search results
    Search,

    /// Text embeddings
    Embedding,

    /// Vector similarity search results
    Vector,

    /// Fused (integrated) search results
    Integrated,
}

impl CacheCategory {
    /// Every category, in reporting order
    pub const ALL: [CacheCategory; 4] = [
        CacheCategory::Search,
        CacheCategory::Embedding,
        CacheCategory::Vector,
        CacheCategory::Integrated,
    ];

    /// Name used as the key-derivation operation and in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheCategory::Search => "search",
            CacheCategory::Embedding => "embedding",
            CacheCategory::Vector => "vector",
            CacheCategory::Integrated => "integrated",
        }
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics snapshot for a single bounded cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CacheStats {
    /// Number of entries currently in cache
    pub size: usize,

    /// Capacity of the cache
    pub max_size: usize,

    /// Total number of cache hits
    pub hits: u64,

    /// Total number of cache misses
    pub misses: u64,

    /// Capacity evictions plus expired-on-read removals
    pub evictions: u64,

    /// Entries pushed out by the capacity bound
    pub capacity_evictions: u64,

    /// Expired entries removed by `get`
    pub expired_on_read: u64,

    /// Expired entries removed by sweeps (not part of `evictions`)
    pub swept: u64,

    /// `100 * hits / total_requests`, two decimals, 0 with no requests
    pub hit_rate_percent: f64,

    /// `hits + misses`
    pub total_requests: u64,
}

impl CacheStats {
    /// Calculate miss rate as a percentage
    pub fn miss_rate_percent(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            round2(100.0 - self.hit_rate_percent)
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ size: {}/{}, hits: {}, misses: {}, hit_rate: {:.2}%, evictions: {}, swept: {} }}",
            self.size,
            self.max_size,
            self.hits,
            self.misses,
            self.hit_rate_percent,
            self.evictions,
            self.swept
        )
    }
}

/// Sums across every category of a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OverallStats {
    pub total_cached_items: usize,
    pub total_hits: u64,
    pub total_misses: u64,
    pub total_evictions: u64,
}

/// Pool-wide statistics report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PoolStats {
    /// Per-category snapshots
    pub categories: BTreeMap<CacheCategory, CacheStats>,

    /// Aggregate over `categories`
    pub overall: OverallStats,
}

impl PoolStats {
    /// Build a report, computing the aggregate from the snapshots
    pub fn from_categories(categories: BTreeMap<CacheCategory, CacheStats>) -> Self {
        let overall = categories
            .values()
            .fold(OverallStats::default(), |mut acc, s| {
                acc.total_cached_items += s.size;
                acc.total_hits += s.hits;
                acc.total_misses += s.misses;
                acc.total_evictions += s.evictions;
                acc
            });

        Self {
            categories,
            overall,
        }
    }

    /// Snapshot for one category
    pub fn category(&self, category: CacheCategory) -> Option<&CacheStats> {
        self.categories.get(&category)
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PoolStats {{ items: {}, hits: {}, misses: {}, evictions: {} }}",
            self.overall.total_cached_items,
            self.overall.total_hits,
            self.overall.total_misses,
            self.overall.total_evictions
        )
    }
}

/// Hit rate in percent, rounded to two decimals
pub(crate) fn hit_rate_percent(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        round2(hits as f64 / total as f64 * 100.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
