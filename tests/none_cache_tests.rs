//! Integration Tests for the No-op Backend

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use typed_cache::{Backend, Cache, CacheError, Cacher, Config, NoneCache};

#[tokio::test]
async fn test_set_then_exists_is_false() {
    let cache = NoneCache::new();

    cache.set("k", &"v".to_string(), Duration::from_secs(60)).await.unwrap();
    assert!(!cache.exists("k").await);
}

#[tokio::test]
async fn test_get_always_not_implemented() {
    let cache = NoneCache::new();
    cache.set("k", &1i32, Duration::ZERO).await.unwrap();

    let mut dest = 0i32;
    let err = cache.get("k", &mut dest).await.unwrap_err();
    assert!(matches!(err, CacheError::NotImplemented));
    assert_eq!(err.to_string(), "Not implemented");
}

#[tokio::test]
async fn test_get_set_never_invokes_callback() {
    let cache = NoneCache::new();
    let called = AtomicBool::new(false);

    let mut dest = String::new();
    let err = cache
        .get_set("k", Duration::from_secs(60), &mut dest, |_, d| {
            called.store(true, Ordering::SeqCst);
            *d = "loaded".to_string();
            Ok(())
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CacheError::NotImplemented));
    assert!(!called.load(Ordering::SeqCst));
    assert!(dest.is_empty());
}

#[tokio::test]
async fn test_writes_always_succeed() {
    let cache = NoneCache::new();

    cache.del("k").await.unwrap();
    cache.expires_in("k", Duration::from_secs(1)).await.unwrap();
    cache
        .expires_at("k", Utc::now() + ChronoDuration::seconds(1))
        .await
        .unwrap();
    cache
        .expires_at("k", Utc::now() - ChronoDuration::seconds(1))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_multiple_operations_leave_nothing_behind() {
    let cache = NoneCache::new();

    for i in 0..5u32 {
        let key = format!("key_{i}");
        cache.set(&key, &i, Duration::from_secs(60)).await.unwrap();
        assert!(!cache.exists(&key).await);

        let mut dest = 0u32;
        assert!(cache.get(&key, &mut dest).await.is_err());
        cache.del(&key).await.unwrap();
    }
}

#[tokio::test]
async fn test_disabled_through_config() {
    let config = Config {
        backend: Backend::None,
        ..Config::default()
    };
    let cache = Cache::from_config(&config).await.unwrap();

    cache.set("k", &1u8, Duration::ZERO).await.unwrap();
    assert!(!cache.exists("k").await);
}
