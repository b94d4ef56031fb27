//! Multi-tier loading cache.
//!
//! Orchestrates an ordered list of cache layers (fastest first) plus a
//! terminal origin loader. Reads cascade fast->slow; a hit backfills every
//! faster layer; a full miss invokes the loader under single-flight
//! coalescing so concurrent misses for one key share one origin call.

use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use beacon_core::{CacheError, LayerError};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::layer::CacheLayer;

/// Fallback function reaching the authoritative origin.
///
/// `Ok(None)` means the origin has no value for the key and is distinct
/// from `Err`, which means the origin itself failed. The cache never
/// conflates the two.
#[async_trait]
pub trait Loader<K, V>: Send + Sync {
    async fn load(&self, key: &K) -> Result<Option<V>, CacheError>;
}

/// Shared outcome of one origin load round.
type LoadOutcome<V> = Result<Option<V>, CacheError>;

/// Receiver half of an in-flight load record.
type OutcomeRx<V> = watch::Receiver<Option<LoadOutcome<V>>>;

struct Inner<K, V> {
    layers: Vec<Arc<dyn CacheLayer<K, V>>>,
    loader: Arc<dyn Loader<K, V>>,
    /// In-flight origin loads, one record per key at a time. The lock is
    /// scoped to map mutation only; the loader itself runs outside it.
    inflight: Mutex<HashMap<K, OutcomeRx<V>>>,
}

/// Multi-tier loading cache.
///
/// Layer order is fixed at construction: index 0 is the fastest tier. A
/// value returned by [`get`](LoadingCache::get) has been - or is being -
/// written back to every layer faster than the one that supplied it.
///
/// Cloning is cheap and shares the same layers, loader and in-flight state.
pub struct LoadingCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for LoadingCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> LoadingCache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new loading cache over `layers` (fastest first) and the
    /// terminal `loader`.
    pub fn new(layers: Vec<Arc<dyn CacheLayer<K, V>>>, loader: Arc<dyn Loader<K, V>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                layers,
                loader,
                inflight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Number of configured layers.
    pub fn layer_count(&self) -> usize {
        self.inner.layers.len()
    }

    /// Get the value for `key`, cascading across layers and falling back
    /// to the origin loader.
    ///
    /// Returns `Ok(None)` when neither any layer nor the origin knows the
    /// key. Fails only on an origin failure or an undecodable cached value;
    /// an unavailable layer is skipped as a miss.
    pub async fn get(&self, key: &K) -> Result<Option<V>, CacheError> {
        for (index, layer) in self.inner.layers.iter().enumerate() {
            match layer.get(key).await {
                Ok(Some(value)) => {
                    debug!(layer = layer.name(), "cache hit");
                    self.backfill_faster(key, &value, index);
                    return Ok(Some(value));
                }
                Ok(None) => {}
                Err(LayerError::Unavailable { layer: name, reason }) => {
                    warn!(layer = %name, %reason, "cache layer unavailable, treating as miss");
                }
                Err(LayerError::Decode { layer: name, reason }) => {
                    return Err(CacheError::Decode {
                        layer: name,
                        reason,
                    });
                }
            }
        }

        self.load_coalesced(key).await
    }

    /// Fire-and-forget writes of `value` into every layer faster than the
    /// one that supplied it, each with its own configured TTL.
    fn backfill_faster(&self, key: &K, value: &V, hit_index: usize) {
        for layer in &self.inner.layers[..hit_index] {
            spawn_put(Arc::clone(layer), key.clone(), value.clone());
        }
    }

    /// Run the origin load for `key`, coalescing with any load already in
    /// flight for the same key.
    async fn load_coalesced(&self, key: &K) -> LoadOutcome<V> {
        enum Role<V> {
            Leader(watch::Sender<Option<LoadOutcome<V>>>),
            Waiter(OutcomeRx<V>),
        }

        let role = {
            let mut inflight = self
                .inner
                .inflight
                .lock()
                .map_err(|_| CacheError::LockPoisoned)?;

            match inflight.entry(key.clone()) {
                MapEntry::Occupied(record) => Role::Waiter(record.get().clone()),
                MapEntry::Vacant(slot) => {
                    let (tx, rx) = watch::channel(None);
                    slot.insert(rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Waiter(mut rx) => {
                debug!("joining in-flight origin load");
                await_outcome(&mut rx).await
            }
            Role::Leader(leader_tx) => {
                // The load runs in its own task so an abandoned leader
                // (request timeout) still serves the other waiters.
                let mut rx = leader_tx.subscribe();
                let inner = Arc::clone(&self.inner);
                let key = key.clone();
                tokio::spawn(async move {
                    let outcome = lead_load(&inner, &key).await;

                    // Clear the record before publishing: once waiters
                    // resume, a new miss must start a fresh leader round.
                    if let Ok(mut inflight) = inner.inflight.lock() {
                        inflight.remove(&key);
                    }
                    leader_tx.send_replace(Some(outcome));
                });

                await_outcome(&mut rx).await
            }
        }
    }
}

/// Invoke the loader once and write the result back into the layers.
async fn lead_load<K, V>(inner: &Inner<K, V>, key: &K) -> LoadOutcome<V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    debug!("cache miss on every layer, invoking origin loader");

    match inner.loader.load(key).await {
        Ok(Some(value)) => {
            // The fastest layer's write lands before any waiter resumes,
            // so an immediate re-read cannot stampede the origin again.
            if let Some((fastest, rest)) = inner.layers.split_first() {
                if let Err(err) = fastest.put(key, &value, fastest.ttl()).await {
                    warn!(layer = fastest.name(), error = %err, "write after origin load failed");
                }
                for layer in rest {
                    spawn_put(Arc::clone(layer), key.clone(), value.clone());
                }
            }
            Ok(Some(value))
        }
        Ok(None) => {
            debug!("origin has no value for key");
            Ok(None)
        }
        Err(err) => {
            warn!(error = %err, "origin load failed");
            Err(err)
        }
    }
}

/// Wait for the shared outcome of an in-flight load.
async fn await_outcome<V: Clone>(rx: &mut OutcomeRx<V>) -> LoadOutcome<V> {
    loop {
        if let Some(outcome) = rx.borrow_and_update().as_ref() {
            return outcome.clone();
        }
        if rx.changed().await.is_err() {
            // Leader task died without publishing.
            return Err(CacheError::Origin {
                reason: "origin load abandoned".to_string(),
            });
        }
    }
}

/// Fire-and-forget write into one layer using that layer's own TTL.
fn spawn_put<K, V>(layer: Arc<dyn CacheLayer<K, V>>, key: K, value: V)
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let ttl = layer.ttl();
        if let Err(err) = layer.put(&key, &value, ttl).await {
            warn!(layer = layer.name(), error = %err, "backfill write failed");
        }
    });
}
