//! Beacon Cache - Multi-Tier Loading Cache
//!
//! This crate implements the caching core of the identity lookup service:
//!
//! - **Cache Layer**: one tier of a cascading cache (`layer.rs`), with an
//!   in-process implementation (`memory.rs`) and a remote, codec-backed
//!   implementation (`remote.rs`)
//! - **Polymorphic Value Codec**: the compact cache-value format used when
//!   values cross a serialization boundary (`codec.rs`)
//! - **Loading Cache**: the cascade-read / write-back / load-coalescing
//!   orchestrator over an ordered list of layers plus an origin loader
//!   (`loading.rs`)
//!
//! # Architecture
//!
//! ```text
//! get(key) ──> layer 0 (in-process, 24h TTL)
//!                 │ miss
//!                 v
//!              layer 1 (shared remote, 48h TTL, codec bytes)
//!                 │ miss
//!                 v
//!              origin loader  (single-flight per key)
//! ```
//!
//! A hit in a slower tier backfills every faster tier; an origin load
//! backfills every tier. Concurrent misses for one key share a single
//! loader invocation.

pub mod codec;
pub mod layer;
pub mod loading;
pub mod memory;
pub mod remote;

pub use codec::{AuthenticatableCodec, PayloadCodec, Utf8Codec};
pub use layer::{CacheLayer, CacheStats};
pub use loading::{Loader, LoadingCache};
pub use memory::{MemoryCacheLayer, MemoryLayerConfig};
pub use remote::{RemoteCacheLayer, RemoteStore};
