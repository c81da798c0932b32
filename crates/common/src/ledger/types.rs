use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::content::ContentId;
use crate::crypto::PublicKey;

pub const MAX_HANDLE_LEN: usize = 320;
pub const MAX_REFERENCE_LEN: usize = 512;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("identity handle must not be empty")]
    EmptyHandle,
    #[error("identity handle is longer than {MAX_HANDLE_LEN} characters")]
    HandleTooLong,
    #[error("identity handle must not contain whitespace or control characters")]
    HandleCharacters,
    #[error("reference must not be empty")]
    EmptyReference,
    #[error("reference is longer than {MAX_REFERENCE_LEN} characters")]
    ReferenceTooLong,
}

/// Name an identity is registered under, usually an e-mail address
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityHandle(String);

impl IdentityHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for IdentityHandle {
    type Err = InvalidInput;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidInput::EmptyHandle);
        }
        if s.chars().count() > MAX_HANDLE_LEN {
            return Err(InvalidInput::HandleTooLong);
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidInput::HandleCharacters);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for IdentityHandle {
    type Error = InvalidInput;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IdentityHandle> for String {
    fn from(handle: IdentityHandle) -> Self {
        handle.0
    }
}

impl fmt::Display for IdentityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for IdentityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityHandle({})", self.0)
    }
}

/// An entry in an identity's transaction log
///
/// Either a [`ContentId`] from a publish, or an externally produced
/// transaction hash recorded as is.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference(String);

impl Reference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Reference {
    type Err = InvalidInput;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidInput::EmptyReference);
        }
        if s.chars().count() > MAX_REFERENCE_LEN {
            return Err(InvalidInput::ReferenceTooLong);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Reference {
    type Error = InvalidInput;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Reference> for String {
    fn from(reference: Reference) -> Self {
        reference.0
    }
}

impl From<ContentId> for Reference {
    fn from(id: ContentId) -> Self {
        Self(id.into())
    }
}

impl From<&ContentId> for Reference {
    fn from(id: &ContentId) -> Self {
        Self(id.as_str().to_string())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({})", self.0)
    }
}

/// Result of appending a reference to a log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum AppendOutcome {
    /// The reference is new and now sits at `position`
    Appended { position: u64 },
    /// The reference was already in the log at `position`; nothing changed
    AlreadyRecorded { position: u64 },
}

impl AppendOutcome {
    pub fn position(&self) -> u64 {
        match self {
            Self::Appended { position } | Self::AlreadyRecorded { position } => *position,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Appended { .. })
    }
}

/// Everything the ledger knows about one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    pub handle: IdentityHandle,
    pub public_key: PublicKey,
    pub log: Vec<Reference>,
}
