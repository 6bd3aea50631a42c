//! # NeoBoi Cache (neoboi-cache)
//!
//! An in-process caching layer for a graph-backed search service. Results of
//! expensive downstream calls are memoized per category with TTL expiry and
//! LRU eviction.
//!
//! ## Features
//!
//! - Thread-safe bounded caches (one lock per category)
//! - TTL expiry with an injectable clock
//! - Deterministic, order-independent cache keys
//! - Pool-wide statistics and expiry sweeps
//! - Optional background sweep task on tokio
//!
//! ## Usage
//!
//! Build one pool at startup and share it with every component that needs it.
//!
//! ```no_run
//! use neoboi_cache::{spawn_auto_sweep, CachePool, CachePoolConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool: Arc<CachePool> = Arc::new(CachePool::new(CachePoolConfig::from_env()?)?);
//!
//!     // Purge expired entries every `sweep_interval`
//!     let sweeper = spawn_auto_sweep(pool.clone());
//!
//!     if let Some(embedding) = pool.get_embedding("what is a knowledge graph?")? {
//!         println!("cached embedding with {} dimensions", embedding.len());
//!     }
//!
//!     println!("{}", pool.stats());
//!     sweeper.abort();
//!     Ok(())
//! }
//! ```
//!
//! ## Single Cache
//!
//! [`BoundedCache`] can also be used on its own:
//!
//! ```rust
//! use neoboi_cache::BoundedCache;
//! use std::num::NonZeroUsize;
//! use std::time::Duration;
//!
//! let cache = BoundedCache::new("sessions", NonZeroUsize::new(2).unwrap());
//! cache.set("a", 1, Duration::from_secs(60));
//! cache.set("b", 2, Duration::from_secs(60));
//! cache.get("a");
//! cache.set("c", 3, Duration::from_secs(60));
//!
//! // "b" was least recently used
//! assert_eq!(cache.get("b"), None);
//! assert_eq!(cache.stats().evictions, 1);
//! ```

pub mod cache;
pub mod error;

// Re-export main types for convenience
pub use cache::{
    canonical_json, derive_key, spawn_auto_sweep, BoundedCache, CacheCategory, CacheEntry,
    CachePool, CachePoolConfig, CachePoolConfigBuilder, CacheStats, CategoryConfig, Clock,
    Embedding, ManualClock, OverallStats, PoolStats, SweepReport, SystemClock,
    DEFAULT_SEARCH_LIMIT, DEFAULT_VECTOR_LIMIT,
};
pub use error::{CacheError, Result};
