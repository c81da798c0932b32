use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of a hex encoded SHA-256 digest
pub const DIGEST_HEX_LEN: usize = 64;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DigestError {
    #[error("digest must be {DIGEST_HEX_LEN} hex characters, got {0}")]
    InvalidLength(usize),
    #[error("digest must be lowercase hex")]
    InvalidCharacters,
}

/// Lowercase hex SHA-256 of a document's plaintext
///
/// This is the document's content fingerprint. It is computed before
/// encryption, independently of the key, and travels next to the published
/// envelope rather than inside it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Digest `data` with SHA-256
    pub fn of(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether `data` hashes to this digest
    pub fn matches(&self, data: &[u8]) -> bool {
        Self::of(data) == *self
    }
}

impl FromStr for ContentDigest {
    type Err = DigestError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != DIGEST_HEX_LEN {
            return Err(DigestError::InvalidLength(s.len()));
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(DigestError::InvalidCharacters);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = DigestError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.0)
    }
}

/// SHA-256 of `data`, lowercase hex
pub fn digest(data: &[u8]) -> ContentDigest {
    ContentDigest::of(data)
}
