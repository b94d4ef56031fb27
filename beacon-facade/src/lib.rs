//! Beacon Facade - Entity Facades and Policy-Driven Population
//!
//! Each facade fronts one entity family and reaches the authoritative
//! origin through a narrow store trait (`stores.rs`). A read request
//! carries an optional [`InflationPolicy`](beacon_core::InflationPolicy);
//! the facade walks the policy tree and inflates exactly the relations it
//! names, fetching independent relations concurrently.
//!
//! The authentication and publisher-salt paths go through two-tier loading
//! caches assembled in `tiers.rs`.

pub mod access;
pub mod auth;
pub mod device;
pub mod publisher;
pub mod stores;
pub mod tiers;
pub mod usage;

pub use access::DeviceAccessFacade;
pub use auth::{AuthenticatableLoader, AuthenticationFacade};
pub use device::DeviceFacade;
pub use publisher::{PublisherFacade, PublisherSaltLoader};
pub use stores::{
    AuthenticationStore, DeviceAccessStore, DeviceStore, IdentityProviderStore, PublisherStore,
};
pub use usage::IdentityProviderUsageFacade;
