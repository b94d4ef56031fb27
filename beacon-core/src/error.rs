//! Error types for Beacon operations.
//!
//! Every enum here is `Clone`: a coalesced cache load produces one outcome
//! that is handed to every waiter, so failures must be shareable values.

use thiserror::Error;

/// Failures of a single cache tier.
///
/// `Unavailable` is recoverable - the cascade treats the tier as a miss.
/// `Decode` means the tier holds bytes that no longer decode to a known
/// value, which is terminal for the read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayerError {
    #[error("Cache layer {layer} unavailable: {reason}")]
    Unavailable { layer: String, reason: String },

    #[error("Cache layer {layer} returned undecodable value: {reason}")]
    Decode { layer: String, reason: String },
}

/// Cache-value codec failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unknown discriminator: {discriminator}")]
    UnknownType { discriminator: String },

    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("Encoding failed: {reason}")]
    Encode { reason: String },
}

/// Failures surfaced by a multi-tier loading cache read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Origin load failed: {reason}")]
    Origin { reason: String },

    #[error("Cached value in layer {layer} could not be decoded: {reason}")]
    Decode { layer: String, reason: String },

    #[error("In-flight load tracking lock poisoned")]
    LockPoisoned,
}

/// Failures of an external collaborator store (origin database, remote
/// cache transport).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Store query failed: {reason}")]
    Query { reason: String },
}

/// Failures surfaced by entity facades.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FacadeError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Bad request: {reason}")]
    BadRequest { reason: String },

    #[error("Invalid inflation expression at position {position}: {message}")]
    Policy { message: String, position: usize },

    #[error("Origin store failed: {reason}")]
    Store { reason: String },

    #[error("Internal error: {reason}")]
    Internal { reason: String },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<StoreError> for FacadeError {
    fn from(err: StoreError) -> Self {
        FacadeError::Store {
            reason: err.to_string(),
        }
    }
}

/// Master error type for all Beacon errors.
#[derive(Debug, Clone, Error)]
pub enum BeaconError {
    #[error("Layer error: {0}")]
    Layer(#[from] LayerError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Facade error: {0}")]
    Facade(#[from] FacadeError),
}

/// Result type alias for Beacon operations.
pub type BeaconResult<T> = Result<T, BeaconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_error_display_unavailable() {
        let err = LayerError::Unavailable {
            layer: "remote".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("remote"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn codec_error_display_unknown_type() {
        let err = CodecError::UnknownType {
            discriminator: "USER".to_string(),
        };
        assert!(format!("{}", err).contains("USER"));
    }

    #[test]
    fn facade_error_from_store_error() {
        let err: FacadeError = StoreError::Unavailable {
            reason: "timeout".to_string(),
        }
        .into();
        assert!(matches!(err, FacadeError::Store { .. }));
        assert!(format!("{}", err).contains("timeout"));
    }

    #[test]
    fn facade_error_from_cache_error_is_transparent() {
        let cache_err = CacheError::Origin {
            reason: "db down".to_string(),
        };
        let err: FacadeError = cache_err.clone().into();
        assert_eq!(format!("{}", err), format!("{}", cache_err));
    }

    #[test]
    fn beacon_error_from_variants() {
        let layer = BeaconError::from(LayerError::Unavailable {
            layer: "local".to_string(),
            reason: "poisoned".to_string(),
        });
        assert!(matches!(layer, BeaconError::Layer(_)));

        let cache = BeaconError::from(CacheError::LockPoisoned);
        assert!(matches!(cache, BeaconError::Cache(_)));

        let facade = BeaconError::from(FacadeError::Unauthorized {
            reason: "bad token".to_string(),
        });
        assert!(matches!(facade, BeaconError::Facade(_)));
    }
}
