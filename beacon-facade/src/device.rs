//! Device facade.
//!
//! Reads a device from the origin, then walks the query's inflation policy
//! to populate the requested relations. `activity` and `history` are
//! independent and fetched concurrently; the populate completes only when
//! both requested fetches complete, and either failure fails the read.

use std::sync::Arc;

use beacon_core::{
    Device, DeviceAccess, DeviceAccessQuery, DeviceQuery, FacadeError, IdentityProviderUsage,
    InflationPolicy,
};
use tracing::debug;

use crate::access::DeviceAccessFacade;
use crate::stores::DeviceStore;
use crate::usage::IdentityProviderUsageFacade;

/// Facade over device reads.
#[derive(Clone)]
pub struct DeviceFacade {
    devices: Arc<dyn DeviceStore>,
    access: DeviceAccessFacade,
    usage: IdentityProviderUsageFacade,
}

impl DeviceFacade {
    pub fn new(
        devices: Arc<dyn DeviceStore>,
        access: DeviceAccessFacade,
        usage: IdentityProviderUsageFacade,
    ) -> Self {
        Self {
            devices,
            access,
            usage,
        }
    }

    /// Read the single device matching `query` and populate the relations
    /// its policy requests.
    pub async fn read(&self, query: &DeviceQuery) -> Result<Device, FacadeError> {
        debug!(
            global_id = query.global_id.as_deref().unwrap_or_default(),
            "reading device"
        );

        let device =
            self.devices
                .read(query)
                .await?
                .ok_or_else(|| FacadeError::NotFound {
                    entity: "device".to_string(),
                    key: query.global_id.clone().unwrap_or_default(),
                })?;

        self.populate(device, query.inflation_policy.as_ref()).await
    }

    /// All devices matching `query`. Shallow; list reads do not inflate.
    pub async fn filter(&self, query: &DeviceQuery) -> Result<Vec<Device>, FacadeError> {
        debug!("filtering devices");
        Ok(self.devices.filter(query).await?)
    }

    /// Inflate the relations of `device` that `policy` requests. Absent
    /// policy means a shallow read.
    async fn populate(
        &self,
        mut device: Device,
        policy: Option<&InflationPolicy>,
    ) -> Result<Device, FacadeError> {
        let Some(policy) = policy else {
            return Ok(device);
        };

        let (activity, history) = tokio::try_join!(
            self.inflate_activity(&device, policy),
            self.inflate_history(&device, policy),
        )?;

        device.activity = activity;
        device.history = history;
        Ok(device)
    }

    async fn inflate_activity(
        &self,
        device: &Device,
        policy: &InflationPolicy,
    ) -> Result<Option<Vec<DeviceAccess>>, FacadeError> {
        if !policy.has_child_field(DeviceQuery::ACTIVITY) {
            return Ok(None);
        }

        let query = DeviceAccessQuery::new()
            .with_device_ids(vec![device.id])
            .with_inflation_policy(policy.child_policy(DeviceQuery::ACTIVITY).cloned());

        Ok(Some(self.access.filter(&query).await?))
    }

    async fn inflate_history(
        &self,
        device: &Device,
        policy: &InflationPolicy,
    ) -> Result<Option<Vec<IdentityProviderUsage>>, FacadeError> {
        if !policy.has_child_field(DeviceQuery::HISTORY) {
            return Ok(None);
        }

        Ok(Some(self.usage.recent_history(device).await?))
    }
}
