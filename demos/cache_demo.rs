//! Cache Pool Demo Application
//!
//! Simulates a search service that memoizes embeddings and search results,
//! with the background sweep running alongside.
//!
//! Usage:
//!   cargo run --example cache_demo
//!
//! Environment variables (also read from `.env`):
//!   CACHE_<CATEGORY>_MAX_SIZE   - capacity for SEARCH, EMBEDDING, VECTOR, INTEGRATED
//!   CACHE_<CATEGORY>_TTL_SECS   - default TTL in seconds per category
//!   CACHE_TTL_JITTER            - jitter factor applied to default TTLs (0.0 - 1.0)
//!   CACHE_SWEEP_INTERVAL_SECS   - background sweep interval (default: 60)
//!   RUST_LOG                    - log filter (default: info)

use neoboi_cache::{spawn_auto_sweep, CachePool, CachePoolConfig, Embedding, DEFAULT_SEARCH_LIMIT};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Stand-in for a call to the local embedding model
async fn compute_embedding(text: &str) -> Embedding {
    tokio::time::sleep(Duration::from_millis(50)).await;
    text.bytes().map(|b| b as f32 / 255.0).collect()
}

/// Stand-in for a call to the full-text index
async fn run_search(query: &str) -> Value {
    tokio::time::sleep(Duration::from_millis(80)).await;
    json!({ "query": query, "docs": [format!("{}-1", query), format!("{}-2", query)] })
}

async fn embed(pool: &CachePool, text: &str) -> anyhow::Result<Embedding> {
    if let Some(cached) = pool.get_embedding(text)? {
        return Ok(cached);
    }
    let embedding = compute_embedding(text).await;
    pool.set_embedding(text, embedding.clone(), None)?;
    Ok(embedding)
}

async fn search(pool: &CachePool, query: &str) -> anyhow::Result<Value> {
    if let Some(cached) = pool.get_search_result(query, None, DEFAULT_SEARCH_LIMIT)? {
        return Ok(cached);
    }
    let result = run_search(query).await;
    pool.set_search_result(query, None, DEFAULT_SEARCH_LIMIT, result.clone(), None)?;
    Ok(result)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("=== Cache Pool Demo ===");

    let config = CachePoolConfig::from_env()?;
    info!("Using config: {:?}", config);

    let pool: Arc<CachePool> = Arc::new(CachePool::new(config)?);
    let sweeper = spawn_auto_sweep(pool.clone());

    let queries = ["knowledge graph", "vector index", "knowledge graph", "ollama", "vector index"];

    for query in queries {
        let started = std::time::Instant::now();
        let embedding = embed(&pool, query).await?;
        let result = search(&pool, query).await?;
        info!(
            "{:<16} dims={} docs={} took={:?}",
            query,
            embedding.len(),
            result["docs"].as_array().map(|d| d.len()).unwrap_or(0),
            started.elapsed()
        );
    }

    let stats = pool.stats();
    info!("{}", stats);
    for (category, category_stats) in &stats.categories {
        info!("  {:<10} {}", category, category_stats);
    }

    let report = pool.clone().sweep_expired_all_async().await?;
    info!("Manual sweep removed: {:?}", report);

    sweeper.abort();
    pool.clear_all();
    info!("=== Demo Complete ===");

    Ok(())
}
