//! Beacon Core - Entity Types
//!
//! Pure data structures shared by every Beacon crate: devices, publishers,
//! identity providers, the `Authenticatable` variant set, query objects and
//! the workspace error taxonomy. This crate contains ONLY data types - no
//! caching or population logic.

pub mod entities;
pub mod error;
pub mod policy;
pub mod query;

pub use entities::{
    Authenticatable, AuthenticatableType, AuthorizationToken, AuthorizationTokenType, Device,
    DeviceAccess, DeviceAccessType, DeviceInfo, DeviceStatus, IdentityProvider,
    IdentityProviderType, IdentityProviderUsage, Publisher, PublisherStatus,
};
pub use error::{
    BeaconError, BeaconResult, CacheError, CodecError, FacadeError, LayerError, StoreError,
};
pub use policy::InflationPolicy;
pub use query::{DeviceAccessQuery, DeviceQuery, PublisherQuery};

use chrono::{DateTime, Utc};

/// Numeric identity assigned by the authoritative origin.
pub type EntityId = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;
