//! Integration tests for the multi-tier loading cache.
//!
//! Exercises the cascade/backfill/coalescing contract end to end over a
//! real in-process tier, a codec-backed fake remote tier and a counting
//! origin loader.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use beacon_cache::{
    AuthenticatableCodec, CacheLayer, LoadingCache, MemoryCacheLayer, MemoryLayerConfig,
    PayloadCodec, RemoteCacheLayer,
};
use beacon_core::{Authenticatable, CacheError};
use beacon_test_utils::{CountingLoader, FakeRemoteStore, UnavailableLayer};

const PREFIX: &str = "AUTHENTICABLE_";
const LOCAL_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const SHARED_TTL: Duration = Duration::from_secs(48 * 60 * 60);

type AuthCache = LoadingCache<String, Authenticatable>;
type AuthLayer = Arc<dyn CacheLayer<String, Authenticatable>>;

fn local_layer() -> Arc<MemoryCacheLayer<String, Authenticatable>> {
    Arc::new(MemoryCacheLayer::new(
        "local",
        MemoryLayerConfig::new().with_ttl(LOCAL_TTL),
    ))
}

fn shared_layer(store: Arc<FakeRemoteStore>) -> Arc<RemoteCacheLayer<Authenticatable, AuthenticatableCodec>> {
    Arc::new(RemoteCacheLayer::new(
        "shared",
        PREFIX,
        SHARED_TTL,
        store,
        AuthenticatableCodec,
    ))
}

fn loader_with(entries: &[(&str, i64)]) -> Arc<CountingLoader<String, Authenticatable>> {
    let values: HashMap<String, Authenticatable> = entries
        .iter()
        .map(|(token, id)| (token.to_string(), Authenticatable::Publisher { id: *id }))
        .collect();
    Arc::new(CountingLoader::new(values))
}

#[tokio::test]
async fn origin_load_backfills_every_tier() {
    let remote = Arc::new(FakeRemoteStore::new());
    let local = local_layer();
    let shared = shared_layer(remote.clone());
    let loader = loader_with(&[("tok", 7)]);

    let layers: Vec<AuthLayer> = vec![local.clone(), shared];
    let cache: AuthCache = LoadingCache::new(layers, loader.clone());

    let value = cache.get(&"tok".to_string()).await.unwrap();
    assert_eq!(value, Some(Authenticatable::Publisher { id: 7 }));
    assert_eq!(loader.calls(), 1);

    // A subsequent read is served without another origin call.
    assert_eq!(
        cache.get(&"tok".to_string()).await.unwrap(),
        Some(Authenticatable::Publisher { id: 7 })
    );
    assert_eq!(loader.calls(), 1);

    // The slower tier fill is fire-and-forget; let it land.
    tokio::task::yield_now().await;
    let bytes = remote.bytes(&format!("{PREFIX}tok")).expect("remote backfilled");
    assert_eq!(
        AuthenticatableCodec.decode(&bytes).unwrap(),
        Authenticatable::Publisher { id: 7 }
    );
    // Each tier is written with its own TTL, not the source's.
    assert_eq!(remote.recorded_ttl(&format!("{PREFIX}tok")), Some(SHARED_TTL));
}

#[tokio::test]
async fn shared_tier_hit_backfills_local_tier() {
    let remote = Arc::new(FakeRemoteStore::new());
    remote.seed(
        format!("{PREFIX}tok"),
        AuthenticatableCodec
            .encode(&Authenticatable::Publisher { id: 9 })
            .unwrap(),
    );

    let local = local_layer();
    let loader = loader_with(&[]);
    let layers: Vec<AuthLayer> = vec![local.clone(), shared_layer(remote)];
    let cache: AuthCache = LoadingCache::new(layers, loader.clone());

    assert_eq!(
        cache.get(&"tok".to_string()).await.unwrap(),
        Some(Authenticatable::Publisher { id: 9 })
    );
    assert_eq!(loader.calls(), 0);

    tokio::task::yield_now().await;
    assert_eq!(
        local.get(&"tok".to_string()).await.unwrap(),
        Some(Authenticatable::Publisher { id: 9 })
    );
}

#[tokio::test(start_paused = true)]
async fn concurrent_misses_share_one_origin_load() {
    let loader = Arc::new(
        CountingLoader::new(HashMap::from([(
            "tok".to_string(),
            Authenticatable::Publisher { id: 3 },
        )]))
        .with_delay(Duration::from_millis(200)),
    );
    let layers: Vec<AuthLayer> = vec![local_layer()];
    let cache: AuthCache = LoadingCache::new(layers, loader.clone());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        handles.push(tokio::spawn(
            async move { cache.get(&"tok".to_string()).await },
        ));
    }

    for handle in handles {
        let value = handle.await.unwrap().unwrap();
        assert_eq!(value, Some(Authenticatable::Publisher { id: 3 }));
    }
    assert_eq!(loader.calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn coalescing_under_real_parallelism() {
    let loader = Arc::new(
        CountingLoader::new(HashMap::from([(
            "tok".to_string(),
            Authenticatable::Publisher { id: 3 },
        )]))
        .with_delay(Duration::from_millis(50)),
    );
    let layers: Vec<AuthLayer> = vec![local_layer()];
    let cache: AuthCache = LoadingCache::new(layers, loader.clone());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get(&"tok".to_string()).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(
            handle.await.unwrap().unwrap(),
            Some(Authenticatable::Publisher { id: 3 })
        );
    }
    assert_eq!(loader.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn origin_failure_is_shared_and_not_sticky() {
    let loader = Arc::new(
        CountingLoader::new(HashMap::from([(
            "tok".to_string(),
            Authenticatable::Publisher { id: 3 },
        )]))
        .with_delay(Duration::from_millis(100)),
    );
    loader.set_failing(true);

    let layers: Vec<AuthLayer> = vec![local_layer()];
    let cache: AuthCache = LoadingCache::new(layers, loader.clone());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let cache = cache.clone();
        handles.push(tokio::spawn(
            async move { cache.get(&"tok".to_string()).await },
        ));
    }
    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, CacheError::Origin { .. }));
    }
    assert_eq!(loader.calls(), 1);

    // The in-flight record is gone; the next miss starts a fresh round.
    loader.set_failing(false);
    assert_eq!(
        cache.get(&"tok".to_string()).await.unwrap(),
        Some(Authenticatable::Publisher { id: 3 })
    );
    assert_eq!(loader.calls(), 2);
}

#[tokio::test]
async fn unavailable_layer_is_treated_as_a_miss() {
    let flaky = Arc::new(UnavailableLayer::new("flaky"));
    let local = local_layer();
    local
        .put(
            &"tok".to_string(),
            &Authenticatable::Publisher { id: 5 },
            local.ttl(),
        )
        .await
        .unwrap();

    let loader = loader_with(&[]);
    let layers: Vec<AuthLayer> = vec![flaky.clone(), local];
    let cache: AuthCache = LoadingCache::new(layers, loader.clone());

    // The faulty fast tier is skipped; the slower tier serves the read.
    assert_eq!(
        cache.get(&"tok".to_string()).await.unwrap(),
        Some(Authenticatable::Publisher { id: 5 })
    );
    assert_eq!(loader.calls(), 0);
    assert!(flaky.get_count() > 0);
}

#[tokio::test]
async fn corrupt_remote_value_is_a_hard_error() {
    let remote = Arc::new(FakeRemoteStore::new());
    remote.seed(format!("{PREFIX}tok"), b"{\"type\":\"GHOST\",\"id\":1}".to_vec());

    let loader = loader_with(&[("tok", 1)]);
    let layers: Vec<AuthLayer> = vec![shared_layer(remote)];
    let cache: AuthCache = LoadingCache::new(layers, loader.clone());

    let err = cache.get(&"tok".to_string()).await.unwrap_err();
    assert!(matches!(err, CacheError::Decode { .. }));
    // Never silently coerced to a default variant, never re-loaded around.
    assert_eq!(loader.calls(), 0);
}

#[tokio::test]
async fn not_found_is_distinct_from_failure() {
    let loader = loader_with(&[]);
    let layers: Vec<AuthLayer> = vec![local_layer()];
    let cache: AuthCache = LoadingCache::new(layers, loader.clone());

    assert_eq!(cache.get(&"unknown".to_string()).await.unwrap(), None);
    assert_eq!(loader.calls(), 1);
}
