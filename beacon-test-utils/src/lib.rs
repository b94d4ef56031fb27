//! Beacon Test Utilities
//!
//! Centralized test infrastructure for the Beacon workspace:
//! - Fake remote store and fault-injecting cache layer
//! - Counting origin loaders
//! - Mock origin stores for the entity facades
//! - Entity fixtures for common scenarios

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use beacon_cache::{CacheLayer, Loader, RemoteStore};
use beacon_core::{
    Authenticatable, CacheError, Device, DeviceAccess, DeviceAccessQuery, DeviceAccessType,
    DeviceInfo, DeviceQuery, DeviceStatus, EntityId, IdentityProvider, IdentityProviderType,
    LayerError, Publisher, PublisherQuery, PublisherStatus, StoreError,
};
use beacon_facade::{
    AuthenticationStore, DeviceAccessStore, DeviceStore, IdentityProviderStore, PublisherStore,
};
use chrono::{Duration as ChronoDuration, Utc};

// ============================================================================
// FAKE REMOTE STORE
// ============================================================================

/// In-memory stand-in for the shared remote cache store.
///
/// Stores raw bytes under namespaced keys, remembers each write's TTL, and
/// can be switched into a failing mode to exercise layer-transient faults.
#[derive(Default)]
pub struct FakeRemoteStore {
    entries: Mutex<HashMap<String, (Vec<u8>, Duration)>>,
    failing: AtomicBool,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl FakeRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Seed raw bytes under a fully namespaced key.
    pub fn seed(&self, key: impl Into<String>, bytes: Vec<u8>) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.into(), (bytes, Duration::ZERO));
    }

    /// The bytes currently stored under `key`, if any.
    pub fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| bytes.clone())
    }

    /// The TTL recorded for `key`'s last write.
    pub fn recorded_ttl(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable {
                reason: "injected fault".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemoteStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.check_available()?;
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes(key))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        self.check_available()?;
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_vec(), ttl));
        Ok(())
    }
}

// ============================================================================
// FAULTY CACHE LAYER
// ============================================================================

/// A cache layer whose every operation fails as layer-transient.
pub struct UnavailableLayer {
    name: String,
    ttl: Duration,
    gets: AtomicUsize,
}

impl UnavailableLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ttl: Duration::from_secs(60),
            gets: AtomicUsize::new(0),
        }
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<K, V> CacheLayer<K, V> for UnavailableLayer
where
    K: Send + Sync,
    V: Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn get(&self, _key: &K) -> Result<Option<V>, LayerError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Err(LayerError::Unavailable {
            layer: self.name.clone(),
            reason: "injected fault".to_string(),
        })
    }

    async fn put(&self, _key: &K, _value: &V, _ttl: Duration) -> Result<(), LayerError> {
        Err(LayerError::Unavailable {
            layer: self.name.clone(),
            reason: "injected fault".to_string(),
        })
    }
}

// ============================================================================
// COUNTING LOADER
// ============================================================================

/// Origin loader over a fixed map, counting invocations.
///
/// An optional artificial delay keeps the load in flight long enough for
/// concurrent callers to pile up in coalescing tests.
pub struct CountingLoader<K, V> {
    values: HashMap<K, V>,
    delay: Option<Duration>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl<K, V> CountingLoader<K, V>
where
    K: std::hash::Hash + Eq,
{
    pub fn new(values: HashMap<K, V>) -> Self {
        Self {
            values,
            delay: None,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Delay every load by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every subsequent load fail with an origin error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of times the loader has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<K, V> Loader<K, V> for CountingLoader<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn load(&self, key: &K) -> Result<Option<V>, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Origin {
                reason: "injected origin failure".to_string(),
            });
        }

        Ok(self.values.get(key).cloned())
    }
}

// ============================================================================
// MOCK ORIGIN STORES
// ============================================================================

/// In-memory device store.
#[derive(Default)]
pub struct MockDeviceStore {
    devices: Mutex<Vec<Device>>,
}

impl MockDeviceStore {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices: Mutex::new(devices),
        }
    }

    fn matches(device: &Device, query: &DeviceQuery) -> bool {
        if let Some(global_id) = &query.global_id {
            if &device.global_id != global_id {
                return false;
            }
        }
        if let Some(ids) = &query.ids {
            if !ids.contains(&device.id) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl DeviceStore for MockDeviceStore {
    async fn read(&self, query: &DeviceQuery) -> Result<Option<Device>, StoreError> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| Self::matches(d, query))
            .cloned())
    }

    async fn filter(&self, query: &DeviceQuery) -> Result<Vec<Device>, StoreError> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .iter()
            .filter(|d| Self::matches(d, query))
            .cloned()
            .collect())
    }
}

/// In-memory device-access store.
#[derive(Default)]
pub struct MockDeviceAccessStore {
    rows: Mutex<Vec<DeviceAccess>>,
    failing: AtomicBool,
}

impl MockDeviceAccessStore {
    pub fn new(rows: Vec<DeviceAccess>) -> Self {
        Self {
            rows: Mutex::new(rows),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeviceAccessStore for MockDeviceAccessStore {
    async fn filter(&self, query: &DeviceAccessQuery) -> Result<Vec<DeviceAccess>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Query {
                reason: "injected fault".to_string(),
            });
        }

        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| match &query.device_ids {
                Some(ids) => ids.contains(&row.device_id),
                None => true,
            })
            .cloned()
            .collect())
    }
}

/// In-memory publisher store.
#[derive(Default)]
pub struct MockPublisherStore {
    publishers: Mutex<Vec<Publisher>>,
    reads: AtomicUsize,
}

impl MockPublisherStore {
    pub fn new(publishers: Vec<Publisher>) -> Self {
        Self {
            publishers: Mutex::new(publishers),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublisherStore for MockPublisherStore {
    async fn read(&self, id: EntityId) -> Result<Option<Publisher>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .publishers
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn filter(&self, query: &PublisherQuery) -> Result<Vec<Publisher>, StoreError> {
        Ok(self
            .publishers
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                let id_match = query.ids.as_ref().map_or(true, |ids| ids.contains(&p.id));
                let code_match = query
                    .codes
                    .as_ref()
                    .map_or(true, |codes| codes.contains(&p.code));
                id_match && code_match
            })
            .cloned()
            .collect())
    }
}

/// In-memory identity-provider store.
#[derive(Default)]
pub struct MockIdentityProviderStore {
    providers: Mutex<Vec<IdentityProvider>>,
}

impl MockIdentityProviderStore {
    pub fn new(providers: Vec<IdentityProvider>) -> Self {
        Self {
            providers: Mutex::new(providers),
        }
    }
}

#[async_trait]
impl IdentityProviderStore for MockIdentityProviderStore {
    async fn read(&self, id: EntityId) -> Result<Option<IdentityProvider>, StoreError> {
        Ok(self
            .providers
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}

/// In-memory token store, counting authenticate calls.
#[derive(Default)]
pub struct MockAuthenticationStore {
    tokens: Mutex<HashMap<String, Authenticatable>>,
    calls: AtomicUsize,
}

impl MockAuthenticationStore {
    pub fn new(tokens: HashMap<String, Authenticatable>) -> Self {
        Self {
            tokens: Mutex::new(tokens),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthenticationStore for MockAuthenticationStore {
    async fn authenticate(&self, token: &str) -> Result<Option<Authenticatable>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tokens.lock().unwrap().get(token).cloned())
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A device fixture with no relations populated.
pub fn sample_device(id: EntityId, global_id: &str) -> Device {
    Device {
        id,
        global_id: global_id.to_string(),
        status: DeviceStatus::Active,
        info: Some(DeviceInfo {
            user_agent: Some("Mozilla/5.0 (test)".to_string()),
        }),
        activity: None,
        history: None,
        created_at: Utc::now() - ChronoDuration::days(30),
        modified_at: Utc::now(),
    }
}

/// A publisher fixture, salt included.
pub fn sample_publisher(id: EntityId, code: &str) -> Publisher {
    Publisher {
        id,
        code: code.to_string(),
        name: format!("Publisher {code}"),
        status: PublisherStatus::Active,
        salt: Some(format!("salt-{id}")),
        created_at: Utc::now() - ChronoDuration::days(90),
        modified_at: Utc::now(),
    }
}

/// An identity-provider fixture.
pub fn sample_provider(id: EntityId, provider_type: IdentityProviderType) -> IdentityProvider {
    IdentityProvider {
        id,
        provider_type,
        entity_id: format!("https://idp-{id}.example.org/shibboleth"),
        name: Some(format!("Provider {id}")),
    }
}

/// An access-row fixture tying a device, publisher and optional provider.
pub fn sample_access(
    id: EntityId,
    device_id: EntityId,
    publisher_id: EntityId,
    identity_provider_id: Option<EntityId>,
    age_minutes: i64,
) -> DeviceAccess {
    DeviceAccess {
        id,
        access_type: DeviceAccessType::AddIdp,
        device_id,
        publisher_id,
        identity_provider_id,
        device: None,
        publisher: None,
        identity_provider: None,
        created_at: Utc::now() - ChronoDuration::minutes(age_minutes),
    }
}
