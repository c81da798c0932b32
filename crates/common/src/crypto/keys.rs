use std::fmt;
use std::ops::Deref;

use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{decode_base64, encode_base64, fill_random, EntropyUnavailable};

/// Size of Ed25519 private key (seed) in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Size of Ed25519 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;
/// Size of an exported keypair (`seed || public`) in bytes
pub const KEYPAIR_EXPORT_SIZE: usize = PRIVATE_KEY_SIZE + PUBLIC_KEY_SIZE;

const PEM_TAG: &str = "PRIVATE KEY";

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error(transparent)]
    EntropyUnavailable(#[from] EntropyUnavailable),
    #[error("invalid key encoding: {0}")]
    Encoding(String),
    #[error("invalid key size, expected {expected}, got {actual}")]
    InvalidSize { expected: usize, actual: usize },
    #[error("invalid public key: {0}")]
    InvalidPublicKey(#[source] ed25519_dalek::SignatureError),
    #[error("exported keypair halves do not match")]
    MismatchedKeyPair,
}

/// Public half of an identity keypair
///
/// This is the only half of an identity that is ever persisted server side.
/// It is bound to an identity handle in the ledger and is used to verify
/// signatures produced by the matching [`SecretKey`].
///
/// Serializes as standard base64 text.
///
/// # Examples
///
/// ```ignore
/// let keys = IdentityKeyPair::generate()?;
/// let encoded = keys.public().to_base64();
/// let recovered = PublicKey::from_base64(&encoded)?;
/// assert_eq!(keys.public(), recovered);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey(VerifyingKey);

impl Deref for PublicKey {
    type Target = VerifyingKey;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        PublicKey(key)
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let buff: [u8; PUBLIC_KEY_SIZE] =
            bytes.try_into().map_err(|_| KeyError::InvalidSize {
                expected: PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            })?;
        Self::from_bytes(&buff)
    }
}

impl TryFrom<String> for PublicKey {
    type Error = KeyError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_base64(&value)
    }
}

impl std::str::FromStr for PublicKey {
    type Err = KeyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64(s)
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.to_base64()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

impl PublicKey {
    /// Build a public key from raw bytes, rejecting points that are not on the curve
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_SIZE]) -> Result<Self, KeyError> {
        VerifyingKey::from_bytes(bytes)
            .map(PublicKey)
            .map_err(KeyError::InvalidPublicKey)
    }

    /// Parse a public key from standard base64 text
    pub fn from_base64(text: &str) -> Result<Self, KeyError> {
        let bytes = decode_base64(text).map_err(|e| KeyError::Encoding(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }

    /// Convert public key to raw bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    /// Convert public key to standard base64 text
    pub fn to_base64(&self) -> String {
        encode_base64(self.0.as_bytes())
    }

    /// Convert public key to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify an Ed25519 signature on a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature does not verify under strict rules.
    pub fn verify(
        &self,
        msg: &[u8],
        signature: &ed25519_dalek::Signature,
    ) -> Result<(), ed25519_dalek::SignatureError> {
        self.0.verify_strict(msg, signature)
    }
}

/// Secret half of an identity keypair
///
/// Never leaves the generating context unless exported on purpose through
/// [`SecretKey::to_pem`] or [`IdentityKeyPair::export`]. `Debug` output never
/// contains key material and the underlying key is zeroized on drop.
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("public", &self.public())
            .finish_non_exhaustive()
    }
}

impl From<[u8; PRIVATE_KEY_SIZE]> for SecretKey {
    fn from(seed: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self(SigningKey::from_bytes(&seed))
    }
}

impl SecretKey {
    /// Generate a new secret key from the OS CSPRNG
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::EntropyUnavailable`] if the random source cannot be read.
    pub fn generate() -> Result<Self, KeyError> {
        let mut seed = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        fill_random(seed.as_mut())?;
        Ok(Self::from(*seed))
    }

    /// Derive the public key from this secret key
    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Sign a message with this secret key using Ed25519.
    pub fn sign(&self, msg: &[u8]) -> ed25519_dalek::Signature {
        use ed25519_dalek::Signer;
        self.0.sign(msg)
    }

    /// Encode the key as `seed || public` in standard base64
    ///
    /// This is the 64 byte layout most Ed25519 client libraries use for a
    /// "secret key", so exports stay interchangeable with them.
    pub fn to_keypair_base64(&self) -> String {
        let bytes = Zeroizing::new(self.0.to_keypair_bytes());
        encode_base64(bytes.as_ref())
    }

    /// Parse a key from the 64 byte `seed || public` base64 layout
    ///
    /// # Errors
    ///
    /// Fails if the text is not base64, is not 64 bytes long, or if the
    /// public half does not belong to the seed.
    pub fn from_keypair_base64(text: &str) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(
            decode_base64(text).map_err(|e| KeyError::Encoding(e.to_string()))?,
        );
        let buff: [u8; KEYPAIR_EXPORT_SIZE] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| KeyError::InvalidSize {
                    expected: KEYPAIR_EXPORT_SIZE,
                    actual: bytes.len(),
                })?;
        let buff = Zeroizing::new(buff);
        SigningKey::from_keypair_bytes(&buff)
            .map(Self)
            .map_err(|_| KeyError::MismatchedKeyPair)
    }

    /// Encode secret key in PEM format for secure storage
    ///
    /// Returns a PEM-encoded string with tag "PRIVATE KEY".
    pub fn to_pem(&self) -> String {
        let pem = pem::Pem::new(PEM_TAG, self.0.to_bytes().to_vec());
        pem::encode(&pem)
    }

    /// Parse a secret key from PEM format
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The PEM string is malformed
    /// - The PEM tag is not "PRIVATE KEY"
    /// - The key size is incorrect
    pub fn from_pem(pem_str: &str) -> Result<Self, KeyError> {
        let pem = pem::parse(pem_str)
            .map_err(|e| KeyError::Encoding(format!("failed to parse PEM: {}", e)))?;

        if pem.tag() != PEM_TAG {
            return Err(KeyError::Encoding(format!(
                "invalid PEM tag, expected {}",
                PEM_TAG
            )));
        }

        let contents = pem.contents();
        let seed: [u8; PRIVATE_KEY_SIZE] =
            contents.try_into().map_err(|_| KeyError::InvalidSize {
                expected: PRIVATE_KEY_SIZE,
                actual: contents.len(),
            })?;
        let seed = Zeroizing::new(seed);
        Ok(Self::from(*seed))
    }
}

/// A matched Ed25519 keypair for one identity
///
/// Both halves come from a single generation call: the public key is always
/// derived from the secret key, never generated on its own.
#[derive(Clone, Debug)]
pub struct IdentityKeyPair {
    secret: SecretKey,
}

impl IdentityKeyPair {
    /// Generate a fresh keypair from the OS CSPRNG
    pub fn generate() -> Result<Self, KeyError> {
        Ok(Self {
            secret: SecretKey::generate()?,
        })
    }

    pub fn public(&self) -> PublicKey {
        self.secret.public()
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// Explicitly export both halves as base64 text
    ///
    /// This is the only path by which the private key leaves the keypair in
    /// a transportable form.
    pub fn export(&self) -> ExportedKeyPair {
        ExportedKeyPair {
            public_key: self.public().to_base64(),
            private_key: self.secret.to_keypair_base64(),
        }
    }
}

impl From<SecretKey> for IdentityKeyPair {
    fn from(secret: SecretKey) -> Self {
        Self { secret }
    }
}

/// Base64 transport form of an identity keypair
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedKeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for ExportedKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedKeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl TryFrom<&ExportedKeyPair> for IdentityKeyPair {
    type Error = KeyError;
    fn try_from(exported: &ExportedKeyPair) -> Result<Self, Self::Error> {
        let secret = SecretKey::from_keypair_base64(&exported.private_key)?;
        let public = PublicKey::from_base64(&exported.public_key)?;
        if secret.public() != public {
            return Err(KeyError::MismatchedKeyPair);
        }
        Ok(Self { secret })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let keys = IdentityKeyPair::generate().unwrap();
        let public_key = keys.public();

        // Public half is derived from the secret half
        assert_eq!(keys.secret().public(), public_key);

        let encoded = public_key.to_base64();
        let recovered = PublicKey::from_base64(&encoded).unwrap();
        assert_eq!(public_key, recovered);
        assert_eq!(public_key.to_bytes().len(), PUBLIC_KEY_SIZE);
    }

    #[test]
    fn test_fresh_keys_are_unrelated() {
        let a = IdentityKeyPair::generate().unwrap();
        let b = IdentityKeyPair::generate().unwrap();
        assert_ne!(a.public(), b.public());
    }

    #[test]
    fn test_pem_serialization() {
        let private_key = SecretKey::generate().unwrap();

        let pem = private_key.to_pem();
        let recovered_private = SecretKey::from_pem(&pem).unwrap();

        assert_eq!(private_key.public(), recovered_private.public());
    }

    #[test]
    fn test_pem_rejects_wrong_tag() {
        let pem = pem::encode(&pem::Pem::new("PUBLIC KEY", vec![0u8; PRIVATE_KEY_SIZE]));
        assert!(matches!(
            SecretKey::from_pem(&pem),
            Err(KeyError::Encoding(_))
        ));
    }

    #[test]
    fn test_export_round_trip() {
        let keys = IdentityKeyPair::generate().unwrap();
        let exported = keys.export();

        // 64 byte keypair layout, 32 byte public key
        assert_eq!(
            decode_base64(&exported.private_key).unwrap().len(),
            KEYPAIR_EXPORT_SIZE
        );
        assert_eq!(
            decode_base64(&exported.public_key).unwrap().len(),
            PUBLIC_KEY_SIZE
        );

        let imported = IdentityKeyPair::try_from(&exported).unwrap();
        assert_eq!(imported.public(), keys.public());
    }

    #[test]
    fn test_export_rejects_mismatched_halves() {
        let keys = IdentityKeyPair::generate().unwrap();
        let other = IdentityKeyPair::generate().unwrap();
        let exported = ExportedKeyPair {
            public_key: other.public().to_base64(),
            private_key: keys.export().private_key,
        };
        assert!(matches!(
            IdentityKeyPair::try_from(&exported),
            Err(KeyError::MismatchedKeyPair)
        ));
    }

    #[test]
    fn test_public_key_size_validation() {
        let short = encode_base64(&[7u8; 16]);
        assert!(matches!(
            PublicKey::from_base64(&short),
            Err(KeyError::InvalidSize {
                expected: PUBLIC_KEY_SIZE,
                actual: 16
            })
        ));
        assert!(matches!(
            PublicKey::from_base64("not base64!!"),
            Err(KeyError::Encoding(_))
        ));
    }

    #[test]
    fn test_public_key_serde_is_base64() {
        let keys = IdentityKeyPair::generate().unwrap();
        let json = serde_json::to_string(&keys.public()).unwrap();
        assert_eq!(json, format!("\"{}\"", keys.public().to_base64()));

        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, keys.public());
    }

    #[test]
    fn test_debug_never_prints_secret() {
        let keys = IdentityKeyPair::generate().unwrap();
        let exported = keys.export();
        let rendered = format!("{:?} {:?}", keys, exported);
        assert!(!rendered.contains(&exported.private_key));
    }

    #[test]
    fn test_sign_and_verify() {
        let secret_key = SecretKey::generate().unwrap();
        let public_key = secret_key.public();
        let message = b"hello, world!";

        let signature = secret_key.sign(message);
        assert!(public_key.verify(message, &signature).is_ok());

        // Verify fails with wrong message
        let wrong_message = b"hello, world?";
        assert!(public_key.verify(wrong_message, &signature).is_err());

        // Verify fails with wrong key
        let other_key = SecretKey::generate().unwrap().public();
        assert!(other_key.verify(message, &signature).is_err());
    }
}
