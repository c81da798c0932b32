use std::fmt;

use serde::Serialize;

use super::{ContentKey, EntropyUnavailable, IdentityKeyPair, KeyError};

/// Generate a fresh Ed25519 identity keypair.
///
/// Each call yields new, unrelated material.
pub fn generate_identity_keys() -> Result<IdentityKeyPair, KeyError> {
    IdentityKeyPair::generate()
}

/// Generate a fresh 256-bit content key.
pub fn generate_content_key() -> Result<ContentKey, EntropyUnavailable> {
    ContentKey::generate()
}

/// Identity keypair and content key generated together, in transport form
///
/// This is the shape handed to a user when they first enroll: the public key
/// is what gets registered, the other two fields stay with the user.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedKeys {
    pub public_key: String,
    pub private_key: String,
    pub symmetric_key: String,
}

impl fmt::Debug for GeneratedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedKeys")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Generate an identity keypair and an independent content key in one go.
pub fn generate_all_keys() -> Result<GeneratedKeys, KeyError> {
    let identity = generate_identity_keys()?.export();
    let content_key = generate_content_key()?;
    Ok(GeneratedKeys {
        public_key: identity.public_key,
        private_key: identity.private_key,
        symmetric_key: content_key.to_base64(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::{PublicKey, SecretKey, CONTENT_KEY_SIZE};

    #[test]
    fn test_generate_all_keys() {
        let keys = generate_all_keys().unwrap();

        let public = PublicKey::from_base64(&keys.public_key).unwrap();
        let secret = SecretKey::from_keypair_base64(&keys.private_key).unwrap();
        assert_eq!(secret.public(), public);

        let content_key = ContentKey::from_base64(&keys.symmetric_key).unwrap();
        assert_eq!(content_key.bytes().len(), CONTENT_KEY_SIZE);
    }

    #[test]
    fn test_generated_keys_wire_shape() {
        let keys = generate_all_keys().unwrap();
        let value = serde_json::to_value(&keys).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("publicKey"));
        assert!(object.contains_key("privateKey"));
        assert!(object.contains_key("symmetricKey"));
        assert_eq!(object.len(), 3);
    }

    #[test]
    fn test_debug_hides_secret_halves() {
        let keys = generate_all_keys().unwrap();
        let rendered = format!("{:?}", keys);
        assert!(!rendered.contains(&keys.private_key));
        assert!(!rendered.contains(&keys.symmetric_key));
    }
}
