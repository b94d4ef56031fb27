//! Identity-provider usage facade.
//!
//! Builds a device's recent history: one entry per identity provider the
//! device has authenticated with, carrying the last activity time and the
//! provider's share of the device's recent sessions, most recent first.

use std::collections::HashMap;
use std::sync::Arc;

use beacon_core::{
    Device, DeviceAccess, DeviceAccessQuery, EntityId, FacadeError, IdentityProviderUsage,
    Timestamp,
};
use futures_util::future::try_join_all;
use tracing::debug;

use crate::stores::{DeviceAccessStore, IdentityProviderStore};

/// Facade aggregating recent identity-provider usage.
#[derive(Clone)]
pub struct IdentityProviderUsageFacade {
    access: Arc<dyn DeviceAccessStore>,
    providers: Arc<dyn IdentityProviderStore>,
}

impl IdentityProviderUsageFacade {
    pub fn new(
        access: Arc<dyn DeviceAccessStore>,
        providers: Arc<dyn IdentityProviderStore>,
    ) -> Self {
        Self { access, providers }
    }

    /// Aggregate the device's recent access rows into per-provider usage.
    pub async fn recent_history(
        &self,
        device: &Device,
    ) -> Result<Vec<IdentityProviderUsage>, FacadeError> {
        debug!(device_id = device.id, "building recent history");

        let query = DeviceAccessQuery::new().with_device_ids(vec![device.id]);
        let rows = self.access.filter(&query).await?;

        let tallies = tally_provider_sessions(&rows);
        let total: usize = tallies.iter().map(|t| t.sessions).sum();
        if total == 0 {
            return Ok(Vec::new());
        }

        let providers = try_join_all(
            tallies
                .iter()
                .map(|tally| self.providers.read(tally.provider_id)),
        )
        .await?;

        let mut history: Vec<IdentityProviderUsage> = tallies
            .into_iter()
            .zip(providers)
            .map(|(tally, provider)| {
                let provider = provider.ok_or_else(|| FacadeError::Internal {
                    reason: format!(
                        "identity provider {} referenced by access rows is missing",
                        tally.provider_id
                    ),
                })?;
                Ok(IdentityProviderUsage {
                    provider,
                    last_active: tally.last_active,
                    frequency: tally.sessions as f64 / total as f64,
                })
            })
            .collect::<Result<_, FacadeError>>()?;

        history.sort_by(|a, b| b.last_active.cmp(&a.last_active));
        Ok(history)
    }
}

struct ProviderTally {
    provider_id: EntityId,
    last_active: Timestamp,
    sessions: usize,
}

/// Count sessions and latest activity per provider across access rows.
fn tally_provider_sessions(rows: &[DeviceAccess]) -> Vec<ProviderTally> {
    let mut by_provider: HashMap<EntityId, ProviderTally> = HashMap::new();

    for row in rows {
        let Some(provider_id) = row.identity_provider_id else {
            continue;
        };
        by_provider
            .entry(provider_id)
            .and_modify(|tally| {
                tally.sessions += 1;
                if row.created_at > tally.last_active {
                    tally.last_active = row.created_at;
                }
            })
            .or_insert(ProviderTally {
                provider_id,
                last_active: row.created_at,
                sessions: 1,
            });
    }

    by_provider.into_values().collect()
}
