use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use super::content_id::{ContentId, ContentIdError};
use crate::document::EnvelopeError;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Transport failure or the store is temporarily unable to serve
    #[error("content store unavailable: {0}")]
    Unavailable(String),
    /// The store refused the payload (size, quota, malformed request)
    #[error("content store rejected payload: {0}")]
    Rejected(String),
    #[error("publish timed out after {0:?}")]
    TimedOut(Duration),
    #[error("publish cancelled")]
    Cancelled,
    #[error("store returned an invalid content id: {0}")]
    InvalidContentId(#[from] ContentIdError),
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

impl PublishError {
    /// Whether a later retry of the same publish could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::TimedOut(_))
    }
}

/// A content-addressed store
///
/// Putting byte-identical payloads must yield the same [`ContentId`] and
/// must not fail because the payload is already present.
#[async_trait]
pub trait ContentStore: Send + Sync + Debug + Clone + 'static {
    async fn put(&self, payload: Vec<u8>) -> Result<ContentId, PublishError>;
}
