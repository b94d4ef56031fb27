//! Device-access facade.
//!
//! Filters access rows and inflates each row's relations - `publisher`,
//! `identityProvider`, `device` - when the query's policy requests them.
//! Relations of one row are fetched concurrently, and all rows are
//! populated concurrently with each other.

use std::sync::Arc;

use beacon_core::{
    DeviceAccess, DeviceAccessQuery, DeviceQuery, FacadeError, InflationPolicy,
};
use futures_util::future::try_join_all;
use tracing::debug;

use crate::stores::{DeviceAccessStore, DeviceStore, IdentityProviderStore, PublisherStore};

/// Facade over device-access rows.
#[derive(Clone)]
pub struct DeviceAccessFacade {
    store: Arc<dyn DeviceAccessStore>,
    devices: Arc<dyn DeviceStore>,
    publishers: Arc<dyn PublisherStore>,
    providers: Arc<dyn IdentityProviderStore>,
}

impl DeviceAccessFacade {
    pub fn new(
        store: Arc<dyn DeviceAccessStore>,
        devices: Arc<dyn DeviceStore>,
        publishers: Arc<dyn PublisherStore>,
        providers: Arc<dyn IdentityProviderStore>,
    ) -> Self {
        Self {
            store,
            devices,
            publishers,
            providers,
        }
    }

    /// All access rows matching `query`, populated per its policy.
    pub async fn filter(&self, query: &DeviceAccessQuery) -> Result<Vec<DeviceAccess>, FacadeError> {
        debug!(?query.device_ids, "filtering device accesses");

        let rows = self.store.filter(query).await?;

        let Some(policy) = query.inflation_policy.as_ref() else {
            return Ok(rows);
        };

        try_join_all(rows.into_iter().map(|row| self.populate(row, policy))).await
    }

    /// Inflate the relations of one row that `policy` requests.
    async fn populate(
        &self,
        mut row: DeviceAccess,
        policy: &InflationPolicy,
    ) -> Result<DeviceAccess, FacadeError> {
        let (publisher, identity_provider, device) = tokio::try_join!(
            self.inflate_publisher(&row, policy),
            self.inflate_provider(&row, policy),
            self.inflate_device(&row, policy),
        )?;

        row.publisher = publisher;
        row.identity_provider = identity_provider;
        row.device = device;
        Ok(row)
    }

    async fn inflate_publisher(
        &self,
        row: &DeviceAccess,
        policy: &InflationPolicy,
    ) -> Result<Option<beacon_core::Publisher>, FacadeError> {
        if !policy.has_child_field(DeviceAccessQuery::PUBLISHER) {
            return Ok(None);
        }

        let publisher = self.publishers.read(row.publisher_id).await?.ok_or_else(|| {
            FacadeError::NotFound {
                entity: "publisher".to_string(),
                key: row.publisher_id.to_string(),
            }
        })?;
        Ok(Some(publisher))
    }

    async fn inflate_provider(
        &self,
        row: &DeviceAccess,
        policy: &InflationPolicy,
    ) -> Result<Option<beacon_core::IdentityProvider>, FacadeError> {
        if !policy.has_child_field(DeviceAccessQuery::IDENTITY_PROVIDER) {
            return Ok(None);
        }
        // Not every access row involves a provider.
        let Some(provider_id) = row.identity_provider_id else {
            return Ok(None);
        };

        let provider = self.providers.read(provider_id).await?.ok_or_else(|| {
            FacadeError::NotFound {
                entity: "identity provider".to_string(),
                key: provider_id.to_string(),
            }
        })?;
        Ok(Some(provider))
    }

    /// The `device` relation on an access row resolves shallowly; nesting
    /// below it is not part of this relation's surface.
    async fn inflate_device(
        &self,
        row: &DeviceAccess,
        policy: &InflationPolicy,
    ) -> Result<Option<beacon_core::Device>, FacadeError> {
        if !policy.has_child_field(DeviceAccessQuery::DEVICE) {
            return Ok(None);
        }

        let query = DeviceQuery::new().with_ids(vec![row.device_id]);
        let device = self.devices.read(&query).await?.ok_or_else(|| {
            FacadeError::NotFound {
                entity: "device".to_string(),
                key: row.device_id.to_string(),
            }
        })?;
        Ok(Some(device))
    }
}
