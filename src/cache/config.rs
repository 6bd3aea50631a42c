//! Configuration for the cache pool

use crate::cache::types::CacheCategory;
use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

/// Capacity and default TTL for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Maximum number of entries before LRU eviction kicks in
    pub max_size: usize,

    /// TTL applied when the caller does not pass one
    pub default_ttl: Duration,
}

impl CategoryConfig {
    /// Create settings for one category
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            max_size,
            default_ttl,
        }
    }
}

/// Configuration for the whole cache pool
///
/// Defaults:
/// - search: 500 entries, 5 minutes
/// - embedding: 200 entries, 1 hour
/// - vector: 300 entries, 10 minutes
/// - integrated: 100 entries, 5 minutes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachePoolConfig {
    pub search: CategoryConfig,
    pub embedding: CategoryConfig,
    pub vector: CategoryConfig,
    pub integrated: CategoryConfig,

    /// TTL jitter factor (0.0 - 1.0) applied to default TTLs
    /// Spreads expiry of entries written together; 0.0 disables it
    pub ttl_jitter: f64,

    /// Interval for the background expiry sweep
    pub sweep_interval: Duration,
}

impl Default for CachePoolConfig {
    fn default() -> Self {
        Self {
            search: CategoryConfig::new(500, Duration::from_secs(300)),
            embedding: CategoryConfig::new(200, Duration::from_secs(3600)),
            vector: CategoryConfig::new(300, Duration::from_secs(600)),
            integrated: CategoryConfig::new(100, Duration::from_secs(300)),
            ttl_jitter: 0.0,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl CachePoolConfig {
    /// Create a new builder for pool configuration
    pub fn builder() -> CachePoolConfigBuilder {
        CachePoolConfigBuilder::default()
    }

    /// Settings for one category
    pub fn category(&self, category: CacheCategory) -> &CategoryConfig {
        match category {
            CacheCategory::Search => &self.search,
            CacheCategory::Embedding => &self.embedding,
            CacheCategory::Vector => &self.vector,
            CacheCategory::Integrated => &self.integrated,
        }
    }

    fn category_mut(&mut self, category: CacheCategory) -> &mut CategoryConfig {
        match category {
            CacheCategory::Search => &mut self.search,
            CacheCategory::Embedding => &mut self.embedding,
            CacheCategory::Vector => &mut self.vector,
            CacheCategory::Integrated => &mut self.integrated,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for category in CacheCategory::ALL {
            let settings = self.category(category);

            self.capacity(category)?;

            if settings.default_ttl.is_zero() {
                return Err(CacheError::ConfigError(format!(
                    "{}.default_ttl must be greater than 0",
                    category
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.ttl_jitter) {
            return Err(CacheError::ConfigError(
                "ttl_jitter must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.sweep_interval.is_zero() {
            return Err(CacheError::ConfigError(
                "sweep_interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Capacity of `category` as a non-zero count
    pub fn capacity(&self, category: CacheCategory) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.category(category).max_size).ok_or_else(|| {
            CacheError::ConfigError(format!("{}.max_size must be greater than 0", category))
        })
    }

    /// Default TTL for `category` with jitter applied
    ///
    /// The result is at least one second and saturates at `Duration::MAX`.
    pub fn ttl_with_jitter(&self, category: CacheCategory) -> Duration {
        let base = self.category(category).default_ttl;
        if self.ttl_jitter == 0.0 {
            return base;
        }

        let spread = self.ttl_jitter * (rand::random::<f64>() * 2.0 - 1.0);
        let secs = (base.as_secs_f64() * (1.0 + spread)).max(1.0);

        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Load configuration from process environment variables
    ///
    /// See [`CachePoolConfig::from_lookup`] for the variable names.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from a variable lookup, starting from defaults
    ///
    /// Recognised variables:
    /// - `CACHE_<CATEGORY>_MAX_SIZE` and `CACHE_<CATEGORY>_TTL_SECS` for
    ///   `SEARCH`, `EMBEDDING`, `VECTOR` and `INTEGRATED`
    /// - `CACHE_TTL_JITTER`
    /// - `CACHE_SWEEP_INTERVAL_SECS`
    ///
    /// The result is validated before being returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        for category in CacheCategory::ALL {
            let prefix = format!("CACHE_{}", category.as_str().to_uppercase());
            let settings = config.category_mut(category);

            if let Some(max_size) = parse_var::<usize, _>(&lookup, &format!("{}_MAX_SIZE", prefix))? {
                settings.max_size = max_size;
            }
            if let Some(secs) = parse_var::<u64, _>(&lookup, &format!("{}_TTL_SECS", prefix))? {
                settings.default_ttl = Duration::from_secs(secs);
            }
        }

        if let Some(jitter) = parse_var::<f64, _>(&lookup, "CACHE_TTL_JITTER")? {
            config.ttl_jitter = jitter;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "CACHE_SWEEP_INTERVAL_SECS")? {
            config.sweep_interval = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            CacheError::ConfigError(format!("invalid value '{}' for {}: {}", raw, name, e))
        }),
    }
}

/// Builder for pool configuration
#[derive(Debug, Default)]
pub struct CachePoolConfigBuilder {
    search: Option<CategoryConfig>,
    embedding: Option<CategoryConfig>,
    vector: Option<CategoryConfig>,
    integrated: Option<CategoryConfig>,
    ttl_jitter: Option<f64>,
    sweep_interval: Option<Duration>,
}

impl CachePoolConfigBuilder {
    /// Set search result capacity and default TTL
    pub fn search(mut self, max_size: usize, default_ttl: Duration) -> Self {
        self.search = Some(CategoryConfig::new(max_size, default_ttl));
        self
    }

    /// Set embedding capacity and default TTL
    pub fn embedding(mut self, max_size: usize, default_ttl: Duration) -> Self {
        self.embedding = Some(CategoryConfig::new(max_size, default_ttl));
        self
    }

    /// Set vector result capacity and default TTL
    pub fn vector(mut self, max_size: usize, default_ttl: Duration) -> Self {
        self.vector = Some(CategoryConfig::new(max_size, default_ttl));
        self
    }

    /// Set integrated result capacity and default TTL
    pub fn integrated(mut self, max_size: usize, default_ttl: Duration) -> Self {
        self.integrated = Some(CategoryConfig::new(max_size, default_ttl));
        self
    }

    /// Set TTL jitter factor (0.0 - 1.0)
    pub fn ttl_jitter(mut self, jitter: f64) -> Self {
        self.ttl_jitter = Some(jitter);
        self
    }

    /// Set background sweep interval
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Build the pool configuration
    ///
    /// Validation happens when the pool is constructed.
    pub fn build(self) -> CachePoolConfig {
        let defaults = CachePoolConfig::default();

        CachePoolConfig {
            search: self.search.unwrap_or(defaults.search),
            embedding: self.embedding.unwrap_or(defaults.embedding),
            vector: self.vector.unwrap_or(defaults.vector),
            integrated: self.integrated.unwrap_or(defaults.integrated),
            ttl_jitter: self.ttl_jitter.unwrap_or(defaults.ttl_jitter),
            sweep_interval: self.sweep_interval.unwrap_or(defaults.sweep_interval),
        }
    }
}
