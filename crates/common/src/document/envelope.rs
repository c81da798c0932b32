use serde::{Deserialize, Serialize};

use super::digest::{ContentDigest, DigestError};
use crate::crypto::{decode_base64, encode_base64};

/// Size of the AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("field `{field}` is not valid base64: {source}")]
    Encoding {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error("field `{field}` must be {expected} bytes, got {actual}")]
    InvalidSize {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid plaintext digest: {0}")]
    Digest(#[from] DigestError),
    #[error("envelope serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A sealed document
///
/// `ciphertext` and `auth_tag` come out of a single detached AEAD call under
/// `iv`. The `plaintext_digest` is over the original bytes and is carried
/// next to the envelope, never inside the published payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    iv: [u8; NONCE_SIZE],
    auth_tag: [u8; TAG_SIZE],
    ciphertext: Vec<u8>,
    plaintext_digest: ContentDigest,
}

impl EncryptedEnvelope {
    pub(crate) fn new(
        iv: [u8; NONCE_SIZE],
        auth_tag: [u8; TAG_SIZE],
        ciphertext: Vec<u8>,
        plaintext_digest: ContentDigest,
    ) -> Self {
        Self {
            iv,
            auth_tag,
            ciphertext,
            plaintext_digest,
        }
    }

    pub fn iv(&self) -> &[u8; NONCE_SIZE] {
        &self.iv
    }

    pub fn auth_tag(&self) -> &[u8; TAG_SIZE] {
        &self.auth_tag
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn plaintext_digest(&self) -> &ContentDigest {
        &self.plaintext_digest
    }

    /// Transport form of the encrypted parts
    pub fn to_wire(&self) -> EnvelopeWire {
        EnvelopeWire {
            iv: encode_base64(&self.iv),
            auth_tag: encode_base64(&self.auth_tag),
            encrypted_data: encode_base64(&self.ciphertext),
        }
    }

    /// Rebuild an envelope from its transport form and the separately
    /// reported digest
    pub fn from_wire(wire: &EnvelopeWire, hash: &str) -> Result<Self, EnvelopeError> {
        let iv = decode_fixed::<NONCE_SIZE>("iv", &wire.iv)?;
        let auth_tag = decode_fixed::<TAG_SIZE>("authTag", &wire.auth_tag)?;
        let ciphertext =
            decode_base64(&wire.encrypted_data).map_err(|source| EnvelopeError::Encoding {
                field: "encryptedData",
                source,
            })?;
        let plaintext_digest = hash.parse()?;
        Ok(Self::new(iv, auth_tag, ciphertext, plaintext_digest))
    }

    /// The exact bytes handed to a content store
    ///
    /// Compact JSON of [`EnvelopeWire`]. Field order is fixed by the struct
    /// definition, so identical envelopes always produce identical bytes.
    pub fn canonical_payload(&self) -> Result<Vec<u8>, EnvelopeError> {
        Ok(serde_json::to_vec(&self.to_wire())?)
    }
}

/// JSON shape of a published envelope: `{"iv","authTag","encryptedData"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeWire {
    pub iv: String,
    pub auth_tag: String,
    pub encrypted_data: String,
}

fn decode_fixed<const N: usize>(field: &'static str, text: &str) -> Result<[u8; N], EnvelopeError> {
    let bytes = decode_base64(text).map_err(|source| EnvelopeError::Encoding { field, source })?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| EnvelopeError::InvalidSize {
            field,
            expected: N,
            actual: bytes.len(),
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::digest;

    fn sample() -> EncryptedEnvelope {
        EncryptedEnvelope::new([7; NONCE_SIZE], [9; TAG_SIZE], vec![1, 2, 3], digest(b"x"))
    }

    #[test]
    fn test_canonical_payload_shape() {
        let payload = sample().canonical_payload().unwrap();
        let text = String::from_utf8(payload).unwrap();
        assert_eq!(
            text,
            r#"{"iv":"BwcHBwcHBwcHBwcH","authTag":"CQkJCQkJCQkJCQkJCQkJCQ==","encryptedData":"AQID"}"#
        );
        assert!(!text.contains(digest(b"x").as_str()));
    }

    #[test]
    fn test_canonical_payload_is_stable() {
        assert_eq!(
            sample().canonical_payload().unwrap(),
            sample().canonical_payload().unwrap()
        );
    }

    #[test]
    fn test_from_wire() {
        let envelope = sample();
        let rebuilt =
            EncryptedEnvelope::from_wire(&envelope.to_wire(), envelope.plaintext_digest().as_str())
                .unwrap();
        assert_eq!(rebuilt, envelope);
    }

    #[test]
    fn test_from_wire_rejects_bad_fields() {
        let mut wire = sample().to_wire();
        wire.iv = encode_base64(&[0u8; 8]);
        let hash = digest(b"x");
        assert!(matches!(
            EncryptedEnvelope::from_wire(&wire, hash.as_str()),
            Err(EnvelopeError::InvalidSize {
                field: "iv",
                expected: NONCE_SIZE,
                actual: 8
            })
        ));

        let mut wire = sample().to_wire();
        wire.encrypted_data = "not base64!".into();
        assert!(matches!(
            EncryptedEnvelope::from_wire(&wire, hash.as_str()),
            Err(EnvelopeError::Encoding {
                field: "encryptedData",
                ..
            })
        ));

        assert!(matches!(
            EncryptedEnvelope::from_wire(&sample().to_wire(), "deadbeef"),
            Err(EnvelopeError::Digest(_))
        ));
    }
}
