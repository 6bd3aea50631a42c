//! Integration tests for the cache module
//!
//! These tests verify the complete cache functionality including:
//! - Hit/miss accounting
//! - TTL expiration with a manual clock
//! - LRU eviction order
//! - Pool-wide stats, clearing and sweeps
//! - Concurrent access from many threads

use neoboi_cache::{
    spawn_auto_sweep, BoundedCache, CacheCategory, CacheError, CachePool, CachePoolConfig,
    ManualClock,
};
use serde_json::{json, Value};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(300);

fn bounded(max_size: usize) -> (BoundedCache<u64>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let cache = BoundedCache::with_clock("it", NonZeroUsize::new(max_size).unwrap(), clock.clone());
    (cache, clock)
}

#[test]
fn test_set_then_get_hits() {
    let (cache, _) = bounded(100);

    for i in 0..50u64 {
        let key = format!("key{}", i);
        cache.set(key.clone(), i, TTL);
        assert_eq!(cache.get(&key), Some(i));
        assert_eq!(cache.stats().hits, i + 1);
    }
}

#[test]
fn test_unknown_and_deleted_keys_miss() {
    let (cache, _) = bounded(10);

    assert_eq!(cache.get("never-set"), None);

    cache.set("gone", 1, TTL);
    assert!(cache.delete("gone"));
    assert_eq!(cache.get("gone"), None);

    let stats = cache.stats();
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 0);
}

#[test]
fn test_recently_touched_key_survives_eviction() {
    let (cache, _) = bounded(3);

    cache.set("k1", 1, TTL);
    cache.set("k2", 2, TTL);
    cache.set("k3", 3, TTL);

    // k1 is now the most recently used entry
    assert_eq!(cache.get("k1"), Some(1));

    cache.set("k4", 4, TTL);
    assert!(cache.len() <= 3);
    assert_eq!(cache.get("k2"), None);

    cache.set("k5", 5, TTL);
    assert!(cache.len() <= 3);
    assert_eq!(cache.get("k1"), Some(1));
    assert_eq!(cache.get("k3"), None);
    assert_eq!(cache.stats().capacity_evictions, 2);
}

#[test]
fn test_size_never_exceeds_capacity() {
    let (cache, _) = bounded(7);

    for i in 0..100u64 {
        cache.set(format!("key{}", i), i, TTL);
        assert!(cache.len() <= 7);
    }

    let stats = cache.stats();
    assert_eq!(stats.size, 7);
    assert_eq!(stats.evictions, 93);
}

#[test]
fn test_expired_get_counts_eviction_and_miss() {
    let (cache, clock) = bounded(10);

    cache.set("k", 1, Duration::from_secs(30));
    clock.advance(Duration::from_secs(31));

    assert_eq!(cache.get("k"), None);

    let stats = cache.stats();
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.size, 0);
}

#[test]
fn test_clear_is_a_full_reset() {
    let (cache, _) = bounded(2);

    cache.set("a", 1, TTL);
    cache.set("b", 2, TTL);
    cache.set("c", 3, TTL);
    cache.get("c");
    cache.get("a");

    cache.clear();

    let stats = cache.stats();
    assert_eq!((stats.size, stats.hits, stats.misses, stats.evictions), (0, 0, 0, 0));
    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("c"), None);
}

#[test]
fn test_concurrent_access_respects_bounds() {
    const THREADS: u64 = 8;
    const OPS: u64 = 10_000;
    const MAX_SIZE: usize = 64;

    let cache: Arc<BoundedCache<u64>> = Arc::new(BoundedCache::new(
        "concurrent",
        NonZeroUsize::new(MAX_SIZE).unwrap(),
    ));

    std::thread::scope(|scope| {
        for t in 0..THREADS {
            let cache = cache.clone();
            scope.spawn(move || {
                for i in 0..OPS {
                    // Disjoint key sets per thread
                    let key = format!("t{}-k{}", t, i % 50);
                    if i % 2 == 0 {
                        cache.set(key, i, TTL);
                    } else {
                        cache.get(&key);
                    }
                    assert!(cache.len() <= MAX_SIZE);
                }
            });
        }
    });

    let stats = cache.stats();
    assert!(stats.size <= MAX_SIZE);
    assert_eq!(stats.hits + stats.misses, THREADS * OPS / 2);
    assert_eq!(stats.total_requests, THREADS * OPS / 2);
}

#[test]
fn test_end_to_end_search_eviction() {
    let config = CachePoolConfig::builder()
        .search(2, Duration::from_secs(300))
        .build();
    let pool: CachePool = CachePool::new(config).unwrap();

    pool.set_search_result("q1", None, 20, json!("r1"), None).unwrap();
    pool.set_search_result("q2", None, 20, json!("r2"), None).unwrap();
    pool.set_search_result("q3", None, 20, json!("r3"), None).unwrap();

    assert!(pool.get_search_result("q1", None, 20).unwrap().is_none());
    assert_eq!(pool.get_search_result("q2", None, 20).unwrap(), Some(json!("r2")));
    assert_eq!(pool.get_search_result("q3", None, 20).unwrap(), Some(json!("r3")));

    let search = pool.stats().categories[&CacheCategory::Search].clone();
    assert_eq!(search.hits, 2);
    assert_eq!(search.misses, 1);
    assert_eq!(search.evictions, 1);
}

#[test]
fn test_pool_rejects_invalid_config() {
    let config = CachePoolConfig::builder()
        .embedding(0, Duration::from_secs(60))
        .build();

    match CachePool::<Value>::new(config) {
        Err(CacheError::ConfigError(msg)) => assert!(msg.contains("embedding")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("pool built from invalid config"),
    }
}

#[test]
fn test_pool_sweep_with_nothing_expired() {
    let pool: CachePool = CachePool::new(CachePoolConfig::default()).unwrap();
    pool.set_embedding("text", vec![0.5; 8], None).unwrap();
    pool.get_embedding("text").unwrap();

    let before = pool.stats();
    let report = pool.sweep_expired_all();

    assert!(report.values().all(|&n| n == 0));
    assert_eq!(pool.stats(), before);
}

#[test]
fn test_pool_shared_across_threads() {
    let pool: Arc<CachePool> = Arc::new(CachePool::new(CachePoolConfig::default()).unwrap());

    std::thread::scope(|scope| {
        for t in 0..4 {
            let pool = pool.clone();
            scope.spawn(move || {
                for i in 0..200 {
                    let query = format!("thread{}-q{}", t, i % 20);
                    if pool.get_vector_result(&query, 10).unwrap().is_none() {
                        pool.set_vector_result(&query, 10, json!(i), None).unwrap();
                    }
                    pool.sweep_expired_all();
                }
            });
        }
    });

    let stats = pool.stats();
    let vector = &stats.categories[&CacheCategory::Vector];
    assert_eq!(vector.total_requests, 800);
    assert_eq!(vector.size, 80);
    assert_eq!(vector.misses, 80);
}

#[test]
fn test_stats_report_serializes() {
    let pool: CachePool = CachePool::new(CachePoolConfig::default()).unwrap();
    pool.get_search_result("q", None, 20).unwrap();

    let report = serde_json::to_value(pool.stats()).unwrap();
    assert_eq!(report["categories"]["search"]["misses"], json!(1));
    assert_eq!(report["overall"]["total_misses"], json!(1));
}

#[tokio::test]
async fn test_auto_sweep_purges_expired_entries() {
    let clock = Arc::new(ManualClock::new());
    let config = CachePoolConfig::builder()
        .sweep_interval(Duration::from_millis(10))
        .build();
    let pool: Arc<CachePool> = Arc::new(CachePool::with_clock(config, clock.clone()).unwrap());

    pool.set_search_result("q", None, 20, json!(1), Some(Duration::from_secs(1)))
        .unwrap();
    pool.set_embedding("keep", vec![1.0], None).unwrap();
    clock.advance(Duration::from_secs(2));

    let handle = spawn_auto_sweep(pool.clone());

    let swept = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let stats = pool.stats();
            if stats.categories[&CacheCategory::Search].swept == 1 {
                break stats;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("auto sweep did not run");

    handle.abort();

    assert_eq!(swept.overall.total_cached_items, 1);
    assert_eq!(swept.overall.total_misses, 0);
}

#[tokio::test]
async fn test_concurrent_async_sweeps() {
    let clock = Arc::new(ManualClock::new());
    let pool: Arc<CachePool> =
        Arc::new(CachePool::with_clock(CachePoolConfig::default(), clock.clone()).unwrap());

    for i in 0..50 {
        pool.set_integrated_result(&format!("q{}", i), None, json!(i), None)
            .unwrap();
    }
    clock.advance(Duration::from_secs(301));

    let sweeps = (0..4).map(|_| pool.clone().sweep_expired_all_async());
    let reports = futures::future::join_all(sweeps).await;

    let removed: usize = reports
        .into_iter()
        .map(|r| r.unwrap()[&CacheCategory::Integrated])
        .sum();
    assert_eq!(removed, 50);
    assert_eq!(pool.stats().categories[&CacheCategory::Integrated].swept, 50);
}
