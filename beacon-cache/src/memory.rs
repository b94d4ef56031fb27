//! In-process cache layer.
//!
//! A capacity-bounded map with TTL expiry on read and least-recently-used
//! eviction under capacity pressure. Values are stored natively; no codec
//! is involved. Time comes from `tokio::time::Instant` so TTL behavior is
//! testable under a paused clock.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use beacon_core::LayerError;
use tokio::time::Instant;

use crate::layer::{CacheLayer, CacheStats};

/// Configuration for an in-process cache layer.
#[derive(Debug, Clone)]
pub struct MemoryLayerConfig {
    /// TTL applied to entries written into this layer.
    pub ttl: Duration,
    /// Maximum number of entries before LRU eviction kicks in.
    pub max_entries: usize,
}

impl Default for MemoryLayerConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            max_entries: 10_000,
        }
    }
}

impl MemoryLayerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum entry count.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) >= self.ttl
    }
}

struct Store<K, V> {
    entries: HashMap<K, Entry<V>>,
    /// LRU order: front = coldest, back = hottest.
    order: VecDeque<K>,
    stats: CacheStats,
}

/// In-process cache layer with TTL expiry and LRU capacity eviction.
pub struct MemoryCacheLayer<K, V> {
    name: String,
    config: MemoryLayerConfig,
    store: Mutex<Store<K, V>>,
}

impl<K, V> MemoryCacheLayer<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new layer with the given log name and configuration.
    pub fn new(name: impl Into<String>, config: MemoryLayerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            store: Mutex::new(Store {
                entries: HashMap::new(),
                order: VecDeque::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    /// Snapshot of this layer's statistics.
    pub fn stats(&self) -> CacheStats {
        match self.store.lock() {
            Ok(store) => CacheStats {
                entry_count: store.entries.len() as u64,
                ..store.stats.clone()
            },
            Err(_) => CacheStats::default(),
        }
    }

    fn lock_err(&self) -> LayerError {
        LayerError::Unavailable {
            layer: self.name.clone(),
            reason: "store lock poisoned".to_string(),
        }
    }
}

#[async_trait]
impl<K, V> CacheLayer<K, V> for MemoryCacheLayer<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn ttl(&self) -> Duration {
        self.config.ttl
    }

    async fn get(&self, key: &K) -> Result<Option<V>, LayerError> {
        let now = Instant::now();
        let mut guard = self.store.lock().map_err(|_| self.lock_err())?;
        let store = &mut *guard;

        let expired = store.entries.get(key).map(|entry| entry.is_expired(now));
        match expired {
            None => {
                store.stats.misses += 1;
                Ok(None)
            }
            Some(true) => {
                store.entries.remove(key);
                store.order.retain(|k| k != key);
                store.stats.misses += 1;
                Ok(None)
            }
            Some(false) => {
                let value = store.entries.get(key).map(|entry| entry.value.clone());
                store.stats.hits += 1;
                // Touch: move to the hot end.
                store.order.retain(|k| k != key);
                store.order.push_back(key.clone());
                Ok(value)
            }
        }
    }

    async fn put(&self, key: &K, value: &V, ttl: Duration) -> Result<(), LayerError> {
        let now = Instant::now();
        let mut guard = self.store.lock().map_err(|_| self.lock_err())?;
        let store = &mut *guard;

        let replaced = store
            .entries
            .insert(
                key.clone(),
                Entry {
                    value: value.clone(),
                    inserted_at: now,
                    ttl,
                },
            )
            .is_some();
        if replaced {
            store.order.retain(|k| k != key);
        }
        store.order.push_back(key.clone());

        while store.entries.len() > self.config.max_entries {
            let Some(victim) = store.order.pop_front() else {
                break;
            };
            if store.entries.remove(&victim).is_some() {
                store.stats.evictions += 1;
            }
        }

        Ok(())
    }
}
