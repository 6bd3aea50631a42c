//! Cache pool facade
//!
//! The pool owns one [`BoundedCache`] per [`CacheCategory`], turns the named
//! arguments of each accessor into a canonical parameter bag, derives the key
//! and routes to the category's cache. Missing optional arguments become
//! explicit empty collections, so `None` and an empty map share a key.

use crate::cache::{
    clock::{Clock, SystemClock},
    config::CachePoolConfig,
    key::derive_key,
    store::BoundedCache,
    types::{CacheCategory, Embedding, PoolStats, SweepReport},
};
use crate::error::{CacheError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result limit callers conventionally use for full-text search
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Result limit callers conventionally use for vector search
pub const DEFAULT_VECTOR_LIMIT: usize = 10;

#[derive(Serialize)]
struct SearchParams<'a> {
    query: &'a str,
    filters: &'a Map<String, Value>,
    limit: usize,
}

#[derive(Serialize)]
struct EmbeddingParams<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct VectorParams<'a> {
    query: &'a str,
    limit: usize,
}

#[derive(Serialize)]
struct IntegratedParams<'a> {
    query: &'a str,
    context: &'a [Value],
}

/// Multi-category cache pool
///
/// `R` is the payload type for search, vector and integrated results.
/// Embeddings are always stored as [`Embedding`]. The pool is meant to be
/// built once at startup and shared (usually behind an `Arc`) with every
/// component that reads or fills it.
pub struct CachePool<R = Value> {
    config: CachePoolConfig,
    search: BoundedCache<R>,
    embedding: BoundedCache<Embedding>,
    vector: BoundedCache<R>,
    integrated: BoundedCache<R>,
}

impl<R: Clone> CachePool<R> {
    /// Create a new pool; fails if `config` does not validate
    pub fn new(config: CachePoolConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new pool whose caches share `clock`
    pub fn with_clock(config: CachePoolConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let pool = Self {
            search: category_cache(&config, CacheCategory::Search, &clock)?,
            embedding: category_cache(&config, CacheCategory::Embedding, &clock)?,
            vector: category_cache(&config, CacheCategory::Vector, &clock)?,
            integrated: category_cache(&config, CacheCategory::Integrated, &clock)?,
            config,
        };

        info!(
            "Cache pool initialized (search: {}, embedding: {}, vector: {}, integrated: {})",
            pool.config.search.max_size,
            pool.config.embedding.max_size,
            pool.config.vector.max_size,
            pool.config.integrated.max_size
        );

        Ok(pool)
    }

    /// Pool configuration
    pub fn config(&self) -> &CachePoolConfig {
        &self.config
    }

    /// Get cached search result
    pub fn get_search_result(
        &self,
        query: &str,
        filters: Option<&Map<String, Value>>,
        limit: usize,
    ) -> Result<Option<R>> {
        let key = search_key(query, filters, limit)?;
        Ok(self.search.get(&key))
    }

    /// Cache search result
    pub fn set_search_result(
        &self,
        query: &str,
        filters: Option<&Map<String, Value>>,
        limit: usize,
        result: R,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = search_key(query, filters, limit)?;
        self.search
            .set(key, result, self.effective_ttl(CacheCategory::Search, ttl));
        Ok(())
    }

    /// Get cached embedding
    pub fn get_embedding(&self, text: &str) -> Result<Option<Embedding>> {
        let key = embedding_key(text)?;
        Ok(self.embedding.get(&key))
    }

    /// Cache embedding
    pub fn set_embedding(&self, text: &str, embedding: Embedding, ttl: Option<Duration>) -> Result<()> {
        let key = embedding_key(text)?;
        self.embedding
            .set(key, embedding, self.effective_ttl(CacheCategory::Embedding, ttl));
        Ok(())
    }

    /// Get cached vector search result
    pub fn get_vector_result(&self, query: &str, limit: usize) -> Result<Option<R>> {
        let key = vector_key(query, limit)?;
        Ok(self.vector.get(&key))
    }

    /// Cache vector search result
    pub fn set_vector_result(
        &self,
        query: &str,
        limit: usize,
        result: R,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = vector_key(query, limit)?;
        self.vector
            .set(key, result, self.effective_ttl(CacheCategory::Vector, ttl));
        Ok(())
    }

    /// Get cached integrated (fused) search result
    pub fn get_integrated_result(&self, query: &str, context: Option<&[Value]>) -> Result<Option<R>> {
        let key = integrated_key(query, context)?;
        Ok(self.integrated.get(&key))
    }

    /// Cache integrated (fused) search result
    pub fn set_integrated_result(
        &self,
        query: &str,
        context: Option<&[Value]>,
        result: R,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = integrated_key(query, context)?;
        self.integrated
            .set(key, result, self.effective_ttl(CacheCategory::Integrated, ttl));
        Ok(())
    }

    /// Key that `params` map to within `category`
    pub fn key_for<P>(&self, category: CacheCategory, params: &P) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        derive_key(category.as_str(), params)
    }

    /// Drop the entry `params` map to within `category`
    ///
    /// `params` must be the full canonical bag (defaults included) for the
    /// key to match what the accessors stored. The typed `invalidate_*`
    /// methods build that bag the same way the accessors do.
    pub fn invalidate<P>(&self, category: CacheCategory, params: &P) -> Result<bool>
    where
        P: Serialize + ?Sized,
    {
        let key = self.key_for(category, params)?;
        Ok(match category {
            CacheCategory::Search => self.search.delete(&key),
            CacheCategory::Embedding => self.embedding.delete(&key),
            CacheCategory::Vector => self.vector.delete(&key),
            CacheCategory::Integrated => self.integrated.delete(&key),
        })
    }

    /// Drop a cached search result
    pub fn invalidate_search(
        &self,
        query: &str,
        filters: Option<&Map<String, Value>>,
        limit: usize,
    ) -> Result<bool> {
        let key = search_key(query, filters, limit)?;
        Ok(self.search.delete(&key))
    }

    /// Drop a cached embedding
    pub fn invalidate_embedding(&self, text: &str) -> Result<bool> {
        let key = embedding_key(text)?;
        Ok(self.embedding.delete(&key))
    }

    /// Drop a cached vector search result
    pub fn invalidate_vector(&self, query: &str, limit: usize) -> Result<bool> {
        let key = vector_key(query, limit)?;
        Ok(self.vector.delete(&key))
    }

    /// Drop a cached integrated (fused) search result
    pub fn invalidate_integrated(&self, query: &str, context: Option<&[Value]>) -> Result<bool> {
        let key = integrated_key(query, context)?;
        Ok(self.integrated.delete(&key))
    }

    /// Clear all caches, resetting their counters
    pub fn clear_all(&self) {
        self.search.clear();
        self.embedding.clear();
        self.vector.clear();
        self.integrated.clear();
        info!("All caches cleared");
    }

    /// Get per-category and aggregate statistics
    pub fn stats(&self) -> PoolStats {
        let mut categories = BTreeMap::new();
        categories.insert(CacheCategory::Search, self.search.stats());
        categories.insert(CacheCategory::Embedding, self.embedding.stats());
        categories.insert(CacheCategory::Vector, self.vector.stats());
        categories.insert(CacheCategory::Integrated, self.integrated.stats());

        PoolStats::from_categories(categories)
    }

    /// Remove expired entries from every category
    ///
    /// Each category is locked only while its own sweep runs.
    pub fn sweep_expired_all(&self) -> SweepReport {
        let mut report = SweepReport::new();
        report.insert(CacheCategory::Search, self.search.sweep_expired());
        report.insert(CacheCategory::Embedding, self.embedding.sweep_expired());
        report.insert(CacheCategory::Vector, self.vector.sweep_expired());
        report.insert(CacheCategory::Integrated, self.integrated.sweep_expired());

        debug!("Expiry sweep finished: {:?}", report);
        report
    }

    fn effective_ttl(&self, category: CacheCategory, ttl: Option<Duration>) -> Duration {
        ttl.unwrap_or_else(|| self.config.ttl_with_jitter(category))
    }
}

impl<R> CachePool<R>
where
    R: Clone + Send + 'static,
{
    /// Run [`CachePool::sweep_expired_all`] on the blocking thread pool
    ///
    /// Whatever each category's sweep committed stands even if the task
    /// fails afterwards.
    pub async fn sweep_expired_all_async(self: Arc<Self>) -> Result<SweepReport> {
        tokio::task::spawn_blocking(move || self.sweep_expired_all())
            .await
            .map_err(|e| CacheError::SweepError(e.to_string()))
    }
}

/// Background task sweeping `pool` every `sweep_interval`
///
/// Runs until the returned handle is aborted or the runtime shuts down.
pub fn spawn_auto_sweep<R>(pool: Arc<CachePool<R>>) -> JoinHandle<()>
where
    R: Clone + Send + 'static,
{
    let interval = pool.config().sweep_interval;

    info!("Starting automatic cache sweep task (interval: {:?})", interval);

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            match pool.clone().sweep_expired_all_async().await {
                Ok(report) => {
                    let removed: usize = report.values().sum();
                    if removed > 0 {
                        debug!("Auto sweep removed {} expired entries", removed);
                    }
                }
                Err(e) => {
                    warn!("Auto sweep failed: {}", e);
                }
            }
        }
    })
}

fn category_cache<V: Clone>(
    config: &CachePoolConfig,
    category: CacheCategory,
    clock: &Arc<dyn Clock>,
) -> Result<BoundedCache<V>> {
    Ok(BoundedCache::with_clock(
        category.as_str(),
        config.capacity(category)?,
        clock.clone(),
    ))
}

fn search_key(query: &str, filters: Option<&Map<String, Value>>, limit: usize) -> Result<String> {
    let empty = Map::new();
    let params = SearchParams {
        query,
        filters: filters.unwrap_or(&empty),
        limit,
    };
    derive_key(CacheCategory::Search.as_str(), &params)
}

fn embedding_key(text: &str) -> Result<String> {
    derive_key(CacheCategory::Embedding.as_str(), &EmbeddingParams { text })
}

fn vector_key(query: &str, limit: usize) -> Result<String> {
    derive_key(CacheCategory::Vector.as_str(), &VectorParams { query, limit })
}

fn integrated_key(query: &str, context: Option<&[Value]>) -> Result<String> {
    let params = IntegratedParams {
        query,
        context: context.unwrap_or(&[]),
    };
    derive_key(CacheCategory::Integrated.as_str(), &params)
}
