//! Publisher facade.
//!
//! Plain reads go to the origin store; the per-publisher encryption salt
//! goes through its own two-tier loading cache so hot salt lookups never
//! touch the origin.

use std::sync::Arc;

use async_trait::async_trait;
use beacon_cache::{Loader, LoadingCache};
use beacon_core::{CacheError, EntityId, FacadeError, Publisher, PublisherQuery};
use tracing::debug;

use crate::stores::PublisherStore;

/// Facade over publisher reads.
#[derive(Clone)]
pub struct PublisherFacade {
    store: Arc<dyn PublisherStore>,
    salt_cache: LoadingCache<EntityId, String>,
}

impl PublisherFacade {
    pub fn new(store: Arc<dyn PublisherStore>, salt_cache: LoadingCache<EntityId, String>) -> Self {
        Self { store, salt_cache }
    }

    /// Read a publisher by id.
    pub async fn read(&self, id: EntityId) -> Result<Publisher, FacadeError> {
        self.store
            .read(id)
            .await?
            .ok_or_else(|| FacadeError::NotFound {
                entity: "publisher".to_string(),
                key: id.to_string(),
            })
    }

    /// All publishers matching `query`.
    pub async fn filter(&self, query: &PublisherQuery) -> Result<Vec<Publisher>, FacadeError> {
        Ok(self.store.filter(query).await?)
    }

    /// Resolve a publisher by its registration code.
    pub async fn lookup_code(&self, code: &str) -> Result<Publisher, FacadeError> {
        debug!(code, "looking up publisher by code");

        let query = PublisherQuery::new().with_codes(vec![code.to_string()]);
        self.store
            .filter(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| FacadeError::BadRequest {
                reason: format!("could not find publisher for code [{code}]"),
            })
    }

    /// The publisher's encryption salt, served through the salt cache.
    ///
    /// Every active publisher has a salt, so a cache-level "not found" is
    /// an internal fault rather than a caller error.
    pub async fn publisher_salt(&self, id: EntityId) -> Result<String, FacadeError> {
        match self.salt_cache.get(&id).await? {
            Some(salt) => Ok(salt),
            None => Err(FacadeError::Internal {
                reason: format!("missing encryption salt for publisher {id}"),
            }),
        }
    }
}

/// Origin loader for the salt cache: reads the publisher row and projects
/// out its salt.
pub struct PublisherSaltLoader {
    store: Arc<dyn PublisherStore>,
}

impl PublisherSaltLoader {
    pub fn new(store: Arc<dyn PublisherStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Loader<EntityId, String> for PublisherSaltLoader {
    async fn load(&self, id: &EntityId) -> Result<Option<String>, CacheError> {
        let publisher = self
            .store
            .read(*id)
            .await
            .map_err(|err| CacheError::Origin {
                reason: err.to_string(),
            })?;

        Ok(publisher.and_then(|p| p.salt))
    }
}
