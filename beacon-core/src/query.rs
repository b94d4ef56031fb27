//! Query objects accepted by the entity facades.
//!
//! Builder-style setters keep call sites readable; the optional
//! `InflationPolicy` on a query is what drives selective population.

use serde::{Deserialize, Serialize};

use crate::policy::InflationPolicy;
use crate::EntityId;

/// Lookup criteria for devices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceQuery {
    pub global_id: Option<String>,
    pub ids: Option<Vec<EntityId>>,
    #[serde(skip)]
    pub inflation_policy: Option<InflationPolicy>,
}

impl DeviceQuery {
    /// Relation field: recent access rows.
    pub const ACTIVITY: &'static str = "activity";
    /// Relation field: recent identity-provider usage.
    pub const HISTORY: &'static str = "history";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global_id(mut self, global_id: impl Into<String>) -> Self {
        self.global_id = Some(global_id.into());
        self
    }

    pub fn with_ids(mut self, ids: Vec<EntityId>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_inflation_policy(mut self, policy: Option<InflationPolicy>) -> Self {
        self.inflation_policy = policy;
        self
    }
}

/// Lookup criteria for device-access rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceAccessQuery {
    pub device_ids: Option<Vec<EntityId>>,
    #[serde(skip)]
    pub inflation_policy: Option<InflationPolicy>,
}

impl DeviceAccessQuery {
    /// Relation field: the publisher behind the access.
    pub const PUBLISHER: &'static str = "publisher";
    /// Relation field: the identity provider used.
    pub const IDENTITY_PROVIDER: &'static str = "identityProvider";
    /// Relation field: the owning device.
    pub const DEVICE: &'static str = "device";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device_ids(mut self, device_ids: Vec<EntityId>) -> Self {
        self.device_ids = Some(device_ids);
        self
    }

    pub fn with_inflation_policy(mut self, policy: Option<InflationPolicy>) -> Self {
        self.inflation_policy = policy;
        self
    }
}

/// Lookup criteria for publishers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublisherQuery {
    pub ids: Option<Vec<EntityId>>,
    pub codes: Option<Vec<String>>,
}

impl PublisherQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(mut self, ids: Vec<EntityId>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_codes(mut self, codes: Vec<String>) -> Self {
        self.codes = Some(codes);
        self
    }
}
