use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};

use common::document::{EncryptedEnvelope, EnvelopeError, EnvelopeWire};

pub mod record;

pub use record::{RecordError, RecordRequest};

use crate::ServiceState;

/// A sealed document as it travels between the CLI and the daemon
///
/// The plaintext digest rides next to the envelope, never inside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SealedDocument {
    pub envelope: EnvelopeWire,
    pub hash: String,
}

impl From<&EncryptedEnvelope> for SealedDocument {
    fn from(envelope: &EncryptedEnvelope) -> Self {
        Self {
            envelope: envelope.to_wire(),
            hash: envelope.plaintext_digest().as_str().to_string(),
        }
    }
}

impl TryFrom<&SealedDocument> for EncryptedEnvelope {
    type Error = EnvelopeError;

    fn try_from(sealed: &SealedDocument) -> Result<Self, Self::Error> {
        EncryptedEnvelope::from_wire(&sealed.envelope, &sealed.hash)
    }
}

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/record", post(record::handler))
        .with_state(state)
}
