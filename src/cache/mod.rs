//! # Multi-Category Caching Layer
//!
//! This module memoizes expensive downstream operations (full-text search,
//! embedding computation, vector lookups, fused search) behind one key/value
//! interface.
//!
//! ## Features
//!
//! - **TTL-Based Expiration**: per-entry time-to-live, checked lazily on read
//!   and eagerly by sweeps
//! - **LRU Eviction**: each category is capacity-bounded and drops its least
//!   recently used entry on overflow
//! - **Per-Category Pools**: search, embedding, vector and integrated results
//!   each get an independently sized cache with its own lock
//! - **Deterministic Keys**: parameter bags are canonicalised (sorted keys)
//!   and hashed, so equal parameters always share a key
//! - **Metrics**: hit/miss/eviction counters per category plus aggregates
//!
//! ## Example
//!
//! ```rust
//! use neoboi_cache::cache::{CachePool, CachePoolConfig, DEFAULT_SEARCH_LIMIT};
//! use serde_json::json;
//!
//! # fn example() -> anyhow::Result<()> {
//! let pool: CachePool = CachePool::new(CachePoolConfig::default())?;
//!
//! if pool.get_search_result("graph rag", None, DEFAULT_SEARCH_LIMIT)?.is_none() {
//!     let result = json!({"docs": ["a", "b"]}); // expensive call goes here
//!     pool.set_search_result("graph rag", None, DEFAULT_SEARCH_LIMIT, result, None)?;
//! }
//!
//! println!("{}", pool.stats());
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod entry;
pub mod key;
pub mod pool;
pub mod store;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CachePoolConfig, CachePoolConfigBuilder, CategoryConfig};
pub use entry::CacheEntry;
pub use key::{canonical_json, derive_key};
pub use pool::{spawn_auto_sweep, CachePool, DEFAULT_SEARCH_LIMIT, DEFAULT_VECTOR_LIMIT};
pub use store::BoundedCache;
pub use types::{CacheCategory, CacheStats, Embedding, OverallStats, PoolStats, SweepReport};
