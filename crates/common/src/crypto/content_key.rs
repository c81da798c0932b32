//! Symmetric content keys for AES-256-GCM
//!
//! A `ContentKey` is the key a document is sealed under. It is 256 bits of
//! uniformly random data read straight from the OS CSPRNG and is never
//! derived from a password or any other low-entropy input.
//!
//! Keys cross process boundaries as a 44 character base64 string. The core
//! never persists them: the ledger only records what was published.

use std::fmt;
use std::ops::Deref;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{decode_base64, encode_base64, fill_random, EntropyUnavailable};

/// Size of an AES-256-GCM key in bytes (256 bits)
pub const CONTENT_KEY_SIZE: usize = 32;

/// Errors that can occur while decoding a content key
#[derive(Debug, thiserror::Error)]
pub enum ContentKeyError {
    #[error("invalid content key size, expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("content key is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
}

/// A 256-bit symmetric key for document encryption
///
/// `Debug` is redacted and there is deliberately no `Display` or serde
/// implementation: the only way to get the key out as text is the explicit
/// [`ContentKey::to_base64`]. The bytes are wiped when the key is dropped.
///
/// # Examples
///
/// ```ignore
/// let key = ContentKey::generate()?;
/// let envelope = document::process(b"hello-world", &key)?;
/// let plaintext = document::open(&envelope, &key)?;
/// ```
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ContentKey([u8; CONTENT_KEY_SIZE]);

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentKey(<redacted>)")
    }
}

impl Deref for ContentKey {
    type Target = [u8; CONTENT_KEY_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; CONTENT_KEY_SIZE]> for ContentKey {
    fn from(bytes: [u8; CONTENT_KEY_SIZE]) -> Self {
        ContentKey(bytes)
    }
}

impl ContentKey {
    /// Generate a new random key from the OS CSPRNG
    ///
    /// # Errors
    ///
    /// Returns [`EntropyUnavailable`] if the random source cannot be read.
    pub fn generate() -> Result<Self, EntropyUnavailable> {
        let mut key = Self([0; CONTENT_KEY_SIZE]);
        fill_random(&mut key.0)?;
        Ok(key)
    }

    /// Create a key from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `CONTENT_KEY_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, ContentKeyError> {
        if data.len() != CONTENT_KEY_SIZE {
            return Err(ContentKeyError::InvalidLength {
                expected: CONTENT_KEY_SIZE,
                actual: data.len(),
            });
        }
        let mut key = Self([0; CONTENT_KEY_SIZE]);
        key.0.copy_from_slice(data);
        Ok(key)
    }

    /// Decode a key from its base64 transport form
    pub fn from_base64(text: &str) -> Result<Self, ContentKeyError> {
        let mut bytes = decode_base64(text)?;
        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        key
    }

    /// Encode the key for transport
    pub fn to_base64(&self) -> String {
        encode_base64(&self.0)
    }

    /// Get a reference to the key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}
