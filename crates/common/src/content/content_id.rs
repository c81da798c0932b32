use std::fmt;
use std::str::FromStr;

use cid::Cid;
use multihash::Multihash;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Multicodec code for raw JSON
pub const JSON_CODEC: u64 = 0x0200;
/// Multihash code for sha2-256
pub const SHA2_256_CODE: u64 = 0x12;

#[derive(Debug, thiserror::Error)]
pub enum ContentIdError {
    #[error("invalid cid: {0}")]
    InvalidCid(#[from] cid::Error),
    #[error("multihash error: {0}")]
    Multihash(#[from] multihash::Error),
}

/// Identifier a content store hands back for a published payload
///
/// Kept in the exact textual form the store returned, so a CIDv0 from a
/// pinning service (`Qm…`) and a locally derived CIDv1 (`bafk…`) both round
/// trip unchanged. Parsing still checks that the text is a well formed CID.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Derive the CIDv1 (json codec, sha2-256) of `payload`
    pub fn for_payload(payload: &[u8]) -> Result<Self, ContentIdError> {
        let hash = Multihash::<64>::wrap(SHA2_256_CODE, &Sha256::digest(payload))?;
        Ok(Self(Cid::new_v1(JSON_CODEC, hash).to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The parsed CID
    pub fn cid(&self) -> Result<Cid, ContentIdError> {
        Ok(Cid::try_from(self.0.as_str())?)
    }
}

impl FromStr for ContentId {
    type Err = ContentIdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Cid::try_from(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ContentId {
    type Error = ContentIdError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

impl From<Cid> for ContentId {
    fn from(cid: Cid) -> Self {
        Self(cid.to_string())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_payload_is_deterministic() {
        let a = ContentId::for_payload(b"{\"iv\":\"a\"}").unwrap();
        let b = ContentId::for_payload(b"{\"iv\":\"a\"}").unwrap();
        let c = ContentId::for_payload(b"{\"iv\":\"b\"}").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_for_payload_is_v1_json() {
        let id = ContentId::for_payload(b"payload").unwrap();
        let cid = id.cid().unwrap();
        assert_eq!(cid.version(), cid::Version::V1);
        assert_eq!(cid.codec(), JSON_CODEC);
        assert_eq!(cid.hash().code(), SHA2_256_CODE);
        assert_eq!(cid.hash().digest(), Sha256::digest(b"payload").as_slice());
        // base32 lower multibase prefix
        assert!(id.as_str().starts_with('b'));
    }

    #[test]
    fn test_parse_keeps_store_form() {
        let v0 = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
        let id: ContentId = v0.parse().unwrap();
        assert_eq!(id.as_str(), v0);

        let v1 = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";
        let id: ContentId = v1.parse().unwrap();
        assert_eq!(id.to_string(), v1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-a-cid".parse::<ContentId>().is_err());
        assert!("".parse::<ContentId>().is_err());
    }
}
