//! Polymorphic cache-value codec.
//!
//! Values crossing a serialization boundary (the shared remote tier) are
//! encoded by a [`PayloadCodec`]. The format is intentionally minimal: a
//! discriminator plus the fields needed to reconstruct the variant, nothing
//! else. Bytes written by one process revision must keep decoding in the
//! next, so the wire shape is pinned by tests.

use beacon_core::{Authenticatable, AuthenticatableType, CodecError, EntityId};
use serde::{Deserialize, Serialize};

/// Encodes and decodes cache values of type `V`.
pub trait PayloadCodec<V>: Send + Sync {
    fn encode(&self, value: &V) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<V, CodecError>;
}

// ============================================================================
// AUTHENTICATABLE CODEC
// ============================================================================

/// Wire shape of a cached `Authenticatable`: `{"type": ..., "id": ...}`.
#[derive(Debug, Serialize, Deserialize)]
struct AuthenticatableWire {
    #[serde(rename = "type")]
    tag: String,
    id: EntityId,
}

/// Codec for the closed `Authenticatable` variant set.
///
/// Decoding dispatches on the discriminator; an unrecognized tag is a hard
/// failure, never a fallback variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatableCodec;

impl PayloadCodec<Authenticatable> for AuthenticatableCodec {
    fn encode(&self, value: &Authenticatable) -> Result<Vec<u8>, CodecError> {
        let wire = AuthenticatableWire {
            tag: value.auth_type().as_str().to_string(),
            id: value.id(),
        };
        serde_json::to_vec(&wire).map_err(|err| CodecError::Encode {
            reason: err.to_string(),
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<Authenticatable, CodecError> {
        let wire: AuthenticatableWire =
            serde_json::from_slice(bytes).map_err(|err| CodecError::InvalidPayload {
                reason: err.to_string(),
            })?;

        if wire.id < 0 {
            return Err(CodecError::InvalidPayload {
                reason: format!("negative identity: {}", wire.id),
            });
        }

        let tag = AuthenticatableType::from_str_tag(&wire.tag).ok_or(CodecError::UnknownType {
            discriminator: wire.tag,
        })?;

        match tag {
            AuthenticatableType::Publisher => Ok(Authenticatable::Publisher { id: wire.id }),
        }
    }
}

// ============================================================================
// UTF-8 STRING CODEC
// ============================================================================

/// Codec for plain string payloads (e.g. the publisher-salt tier).
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl PayloadCodec<String> for Utf8Codec {
    fn encode(&self, value: &String) -> Result<Vec<u8>, CodecError> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        String::from_utf8(bytes.to_vec()).map_err(|err| CodecError::InvalidPayload {
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticatable_round_trip() {
        let codec = AuthenticatableCodec;
        for id in [0, 1, 42, EntityId::MAX] {
            let value = Authenticatable::Publisher { id };
            let bytes = codec.encode(&value).unwrap();
            assert_eq!(codec.decode(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn wire_shape_is_pinned() {
        let bytes = AuthenticatableCodec
            .encode(&Authenticatable::Publisher { id: 123 })
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({"type": "PUBLISHER", "id": 123}));
    }

    #[test]
    fn decodes_externally_written_bytes() {
        let value = AuthenticatableCodec
            .decode(br#"{"type": "PUBLISHER", "id": 7}"#)
            .unwrap();
        assert_eq!(value, Authenticatable::Publisher { id: 7 });
    }

    #[test]
    fn unknown_discriminator_is_a_hard_failure() {
        let err = AuthenticatableCodec
            .decode(br#"{"type": "USER", "id": 7}"#)
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownType {
                discriminator: "USER".to_string()
            }
        );
    }

    #[test]
    fn negative_identity_fails_cleanly() {
        let err = AuthenticatableCodec
            .decode(br#"{"type": "PUBLISHER", "id": -1}"#)
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidPayload { .. }));
    }

    #[test]
    fn garbage_bytes_fail_cleanly() {
        assert!(AuthenticatableCodec.decode(b"not json").is_err());
        assert!(AuthenticatableCodec.decode(b"").is_err());
    }

    #[test]
    fn utf8_codec_round_trip() {
        let codec = Utf8Codec;
        let salt = "$2a$10$abcdefghijklmnopqrstuv".to_string();
        let bytes = codec.encode(&salt).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), salt);
    }

    #[test]
    fn utf8_codec_rejects_invalid_bytes() {
        assert!(Utf8Codec.decode(&[0xff, 0xfe]).is_err());
    }
}
