//! Standard cache tierings.
//!
//! Assembles the two production loading caches: a process-local tier over
//! a shared remote tier over the origin. TTLs and key prefixes match the
//! service's deployed configuration.

use std::sync::Arc;
use std::time::Duration;

use beacon_cache::{
    AuthenticatableCodec, CacheLayer, LoadingCache, MemoryCacheLayer, MemoryLayerConfig,
    RemoteCacheLayer, RemoteStore, Utf8Codec,
};
use beacon_core::{Authenticatable, EntityId};

use crate::auth::AuthenticatableLoader;
use crate::publisher::PublisherSaltLoader;
use crate::stores::{AuthenticationStore, PublisherStore};

/// Key namespace of the shared authenticatable tier.
pub const AUTHENTICATABLE_KEY_PREFIX: &str = "AUTHENTICABLE_";
/// Key namespace of the shared publisher-salt tier.
pub const PUBLISHER_SALT_KEY_PREFIX: &str = "PUBLISHER_SALT_";

/// TTL of the process-local tier.
pub const LOCAL_TIER_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// TTL of the shared remote tier.
pub const SHARED_TIER_TTL: Duration = Duration::from_secs(48 * 60 * 60);

/// Build the two-tier token-to-principal cache.
pub fn authenticatable_cache(
    remote: Arc<dyn RemoteStore>,
    origin: Arc<dyn AuthenticationStore>,
) -> LoadingCache<String, Authenticatable> {
    let local = Arc::new(MemoryCacheLayer::new(
        "local",
        MemoryLayerConfig::new().with_ttl(LOCAL_TIER_TTL),
    ));
    let shared = Arc::new(RemoteCacheLayer::new(
        "shared",
        AUTHENTICATABLE_KEY_PREFIX,
        SHARED_TIER_TTL,
        remote,
        AuthenticatableCodec,
    ));

    let layers: Vec<Arc<dyn CacheLayer<String, Authenticatable>>> = vec![local, shared];
    LoadingCache::new(layers, Arc::new(AuthenticatableLoader::new(origin)))
}

/// Build the two-tier publisher-salt cache.
pub fn publisher_salt_cache(
    remote: Arc<dyn RemoteStore>,
    origin: Arc<dyn PublisherStore>,
) -> LoadingCache<EntityId, String> {
    let local = Arc::new(MemoryCacheLayer::new(
        "local",
        MemoryLayerConfig::new().with_ttl(LOCAL_TIER_TTL),
    ));
    let shared = Arc::new(RemoteCacheLayer::new(
        "shared",
        PUBLISHER_SALT_KEY_PREFIX,
        SHARED_TIER_TTL,
        remote,
        Utf8Codec,
    ));

    let layers: Vec<Arc<dyn CacheLayer<EntityId, String>>> = vec![local, shared];
    LoadingCache::new(layers, Arc::new(PublisherSaltLoader::new(origin)))
}
