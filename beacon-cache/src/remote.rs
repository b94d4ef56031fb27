//! Remote cache layer.
//!
//! Wraps a byte-oriented remote store (a shared cache tier reached over the
//! network) behind the [`CacheLayer`] contract. Keys are namespaced as
//! `<prefix><rawKey>`; values pass through a [`PayloadCodec`] at the
//! serialization boundary.

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use beacon_core::{LayerError, StoreError};

use crate::codec::PayloadCodec;
use crate::layer::CacheLayer;

/// Transport to a remote key/value store.
///
/// The store speaks namespaced string keys and opaque byte values; every
/// write carries an expiry. Implementations must be thread-safe.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read the bytes stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value` under `key` with the given expiry.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError>;
}

/// A cache layer backed by a remote store.
pub struct RemoteCacheLayer<V, C> {
    name: String,
    prefix: String,
    ttl: Duration,
    store: Arc<dyn RemoteStore>,
    codec: C,
    _value: PhantomData<fn() -> V>,
}

impl<V, C> RemoteCacheLayer<V, C> {
    /// Create a new remote layer.
    ///
    /// `prefix` namespaces this layer's keys within the shared store;
    /// `ttl` is the expiry applied to every write into this tier.
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        ttl: Duration,
        store: Arc<dyn RemoteStore>,
        codec: C,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            ttl,
            store,
            codec,
            _value: PhantomData,
        }
    }

    fn namespaced(&self, key: &impl Display) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn unavailable(&self, err: StoreError) -> LayerError {
        LayerError::Unavailable {
            layer: self.name.clone(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl<K, V, C> CacheLayer<K, V> for RemoteCacheLayer<V, C>
where
    K: Display + Send + Sync,
    V: Send + Sync,
    C: PayloadCodec<V>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn get(&self, key: &K) -> Result<Option<V>, LayerError> {
        let bytes = self
            .store
            .get(&self.namespaced(key))
            .await
            .map_err(|err| self.unavailable(err))?;

        match bytes {
            Some(bytes) => {
                let value = self.codec.decode(&bytes).map_err(|err| LayerError::Decode {
                    layer: self.name.clone(),
                    reason: err.to_string(),
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &K, value: &V, ttl: Duration) -> Result<(), LayerError> {
        let bytes = self.codec.encode(value).map_err(|err| LayerError::Decode {
            layer: self.name.clone(),
            reason: err.to_string(),
        })?;

        self.store
            .set(&self.namespaced(key), &bytes, ttl)
            .await
            .map_err(|err| self.unavailable(err))
    }
}
