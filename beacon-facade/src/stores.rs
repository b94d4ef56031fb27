//! Origin store traits.
//!
//! External collaborators (the relational origin, remote transports) are
//! reached exclusively through these narrow async interfaces. "Not found"
//! is `Ok(None)` or an empty collection; `Err` always means the store
//! itself failed.

use async_trait::async_trait;
use beacon_core::{
    Authenticatable, Device, DeviceAccess, DeviceAccessQuery, DeviceQuery, EntityId,
    IdentityProvider, Publisher, PublisherQuery, StoreError,
};

/// Origin access to device rows.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Read the single device matching `query`.
    async fn read(&self, query: &DeviceQuery) -> Result<Option<Device>, StoreError>;

    /// All devices matching `query`.
    async fn filter(&self, query: &DeviceQuery) -> Result<Vec<Device>, StoreError>;
}

/// Origin access to device-access rows.
#[async_trait]
pub trait DeviceAccessStore: Send + Sync {
    /// All access rows matching `query`, most recent first.
    async fn filter(&self, query: &DeviceAccessQuery) -> Result<Vec<DeviceAccess>, StoreError>;
}

/// Origin access to publisher rows.
#[async_trait]
pub trait PublisherStore: Send + Sync {
    async fn read(&self, id: EntityId) -> Result<Option<Publisher>, StoreError>;

    async fn filter(&self, query: &PublisherQuery) -> Result<Vec<Publisher>, StoreError>;
}

/// Origin access to identity-provider rows.
#[async_trait]
pub trait IdentityProviderStore: Send + Sync {
    async fn read(&self, id: EntityId) -> Result<Option<IdentityProvider>, StoreError>;
}

/// Origin resolution of API tokens to principals.
///
/// Idempotent and side-effect-free from the cache's perspective; this is
/// the terminal loader behind the authenticatable cache.
#[async_trait]
pub trait AuthenticationStore: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<Option<Authenticatable>, StoreError>;
}
