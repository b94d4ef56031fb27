//! Domain entities for the identity lookup service.
//!
//! Relation fields (`Device::activity`, `DeviceAccess::publisher`, ...) are
//! `Option` and stay `None` until a populate pass inflates them; a shallow
//! read never touches them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::EntityId;

// ============================================================================
// DEVICE
// ============================================================================

/// Lifecycle status of a device record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceStatus {
    Active,
    Deleted,
}

/// Client-reported metadata captured when a device is first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// A browser/device known to the service, addressed by its opaque global id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: EntityId,
    pub global_id: String,
    pub status: DeviceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<DeviceInfo>,
    /// Recent access rows; populated on request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<Vec<DeviceAccess>>,
    /// Recent identity-provider usage; populated on request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<IdentityProviderUsage>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

// ============================================================================
// DEVICE ACCESS
// ============================================================================

/// What an access row recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceAccessType {
    AddIdp,
    ReadIdpHistory,
    RemoveIdp,
}

/// One recorded interaction between a device, a publisher and an identity
/// provider. The flat `*_id` columns are always present; the corresponding
/// relation fields are inflated on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAccess {
    pub id: EntityId,
    pub access_type: DeviceAccessType,
    pub device_id: EntityId,
    pub publisher_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_provider_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_provider: Option<IdentityProvider>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// PUBLISHER
// ============================================================================

/// Lifecycle status of a publisher account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublisherStatus {
    Active,
    Inactive,
}

/// A publisher account that integrates with the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: EntityId,
    pub code: String,
    pub name: String,
    pub status: PublisherStatus,
    /// Per-publisher encryption salt. Never serialized out.
    #[serde(skip)]
    pub salt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

// ============================================================================
// IDENTITY PROVIDER
// ============================================================================

/// Federation protocol a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityProviderType {
    Saml,
    OpenAthens,
    Oauth,
}

/// An institutional identity provider a device has authenticated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityProvider {
    pub id: EntityId,
    pub provider_type: IdentityProviderType,
    /// Protocol-level entity identifier (SAML entity id, OAuth issuer, ...).
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Aggregated recent usage of one identity provider by one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityProviderUsage {
    pub provider: IdentityProvider,
    pub last_active: DateTime<Utc>,
    /// Share of the device's recent sessions that used this provider.
    pub frequency: f64,
}

// ============================================================================
// AUTHENTICATABLE
// ============================================================================

/// Discriminator for the closed `Authenticatable` variant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticatableType {
    Publisher,
}

impl AuthenticatableType {
    /// Wire discriminator string used by the cache-value codec.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticatableType::Publisher => "PUBLISHER",
        }
    }

    /// Parse a wire discriminator. Returns `None` for unknown tags; the
    /// codec turns that into a hard decode failure.
    pub fn from_str_tag(tag: &str) -> Option<Self> {
        match tag {
            "PUBLISHER" => Some(AuthenticatableType::Publisher),
            _ => None,
        }
    }
}

/// A principal that can authenticate against the service.
///
/// Closed variant set: only the discriminator and the numeric identity
/// survive the cache path, so each variant carries exactly that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authenticatable {
    Publisher { id: EntityId },
}

impl Authenticatable {
    pub fn auth_type(&self) -> AuthenticatableType {
        match self {
            Authenticatable::Publisher { .. } => AuthenticatableType::Publisher,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            Authenticatable::Publisher { id } => *id,
        }
    }

    /// The publisher identity, if this principal is a publisher.
    pub fn as_publisher_id(&self) -> Option<EntityId> {
        match self {
            Authenticatable::Publisher { id } => Some(*id),
        }
    }
}

// ============================================================================
// AUTHORIZATION TOKEN
// ============================================================================

/// Scheme prefix of an `Authorization` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationTokenType {
    /// `Token <value>` - an opaque API token.
    ApiToken,
    /// `Bearer <value>` - a signed session token.
    Jwt,
}

impl AuthorizationTokenType {
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "Token" => Some(AuthorizationTokenType::ApiToken),
            "Bearer" => Some(AuthorizationTokenType::Jwt),
            _ => None,
        }
    }
}

/// A parsed `Authorization` header value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationToken {
    pub token_type: AuthorizationTokenType,
    pub value: String,
}
