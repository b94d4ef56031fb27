//! Authentication facade.
//!
//! Parses `Authorization` header values and resolves API tokens to
//! principals through the two-tier authenticatable cache. Only opaque API
//! tokens (`Token` prefix) authenticate through this path; signed session
//! tokens are validated elsewhere.

use std::sync::Arc;

use async_trait::async_trait;
use beacon_cache::{Loader, LoadingCache};
use beacon_core::{
    Authenticatable, AuthorizationToken, AuthorizationTokenType, CacheError, FacadeError,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::stores::AuthenticationStore;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Token|Bearer) (.+)$").expect("static token pattern"));

/// Facade over token authentication.
#[derive(Clone)]
pub struct AuthenticationFacade {
    cache: LoadingCache<String, Authenticatable>,
}

impl AuthenticationFacade {
    pub fn new(cache: LoadingCache<String, Authenticatable>) -> Self {
        Self { cache }
    }

    /// Parse an `Authorization` header value of the shape
    /// `(Token|Bearer) <value>`.
    pub fn parse_authorization_header(
        &self,
        value: &str,
    ) -> Result<AuthorizationToken, FacadeError> {
        let captures = TOKEN_PATTERN
            .captures(value)
            .ok_or_else(|| FacadeError::BadRequest {
                reason: "could not parse authorization header".to_string(),
            })?;

        let token_type = AuthorizationTokenType::from_prefix(&captures[1]).ok_or_else(|| {
            FacadeError::BadRequest {
                reason: "unsupported authorization scheme".to_string(),
            }
        })?;

        Ok(AuthorizationToken {
            token_type,
            value: captures[2].to_string(),
        })
    }

    /// Resolve an API token to its principal.
    ///
    /// An unknown token is `Unauthorized`; a cache or origin failure
    /// surfaces as is rather than masquerading as a bad token.
    pub async fn authenticate(
        &self,
        token: &AuthorizationToken,
    ) -> Result<Authenticatable, FacadeError> {
        if token.token_type != AuthorizationTokenType::ApiToken {
            return Err(FacadeError::Unauthorized {
                reason: "unsupported token type".to_string(),
            });
        }

        debug!("authenticating token");

        match self.cache.get(&token.value).await? {
            Some(principal) => Ok(principal),
            None => Err(FacadeError::Unauthorized {
                reason: "could not authenticate token".to_string(),
            }),
        }
    }
}

/// Origin loader for the authenticatable cache.
pub struct AuthenticatableLoader {
    store: Arc<dyn AuthenticationStore>,
}

impl AuthenticatableLoader {
    pub fn new(store: Arc<dyn AuthenticationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Loader<String, Authenticatable> for AuthenticatableLoader {
    async fn load(&self, token: &String) -> Result<Option<Authenticatable>, CacheError> {
        self.store
            .authenticate(token)
            .await
            .map_err(|err| CacheError::Origin {
                reason: err.to_string(),
            })
    }
}
