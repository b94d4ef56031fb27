//! Cache layer trait.
//!
//! A layer is one tier of a cascading cache: a key/value store with its own
//! TTL and eviction policy. Absence of a key is a normal result (`Ok(None)`),
//! never an error.

use std::time::Duration;

use async_trait::async_trait;
use beacon_core::LayerError;

/// One tier of a cascading cache.
///
/// Implementations must be internally thread-safe; every call is a
/// potential suspension point (remote tiers block on I/O).
///
/// # Failure contract
///
/// A read or write failure of the backing store is reported as
/// [`LayerError::Unavailable`]; the cascade treats it as a miss for this
/// layer and keeps going. [`LayerError::Decode`] means the layer returned
/// bytes that no longer decode to a known value and is terminal for the
/// read.
#[async_trait]
pub trait CacheLayer<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    /// Short name for log context (e.g. `"local"`, `"shared"`).
    fn name(&self) -> &str;

    /// The TTL this layer applies to entries written into it.
    ///
    /// Backfill writes always use the receiving layer's own TTL, never the
    /// TTL of the tier the value came from.
    fn ttl(&self) -> Duration;

    /// Get a value from this layer.
    async fn get(&self, key: &K) -> Result<Option<V>, LayerError>;

    /// Put a value into this layer with the given TTL.
    async fn put(&self, key: &K, value: &V, ttl: Duration) -> Result<(), LayerError>;
}

/// Statistics about one cache layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses (including expired entries).
    pub misses: u64,
    /// Number of evictions due to capacity.
    pub evictions: u64,
    /// Number of entries currently stored.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
