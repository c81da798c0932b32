use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::document::{EncryptedEnvelope, EnvelopeError};
use common::ledger::{IdentityHandle, LedgerError};
use common::prelude::{PipelineError, PublishError, RecordedDocument};

use super::SealedDocument;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    pub identity_handle: IdentityHandle,
    #[serde(flatten)]
    pub sealed: SealedDocument,
}

/// Publish a sealed document and append its CID to the identity's log
///
/// Abandoned without touching the ledger if the daemon starts shutting
/// down before the content is published.
#[tracing::instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<RecordRequest>,
) -> Result<impl IntoResponse, RecordError> {
    tracing::debug!(identity = %req.identity_handle, hash = %req.sealed.hash, "recording document");
    let envelope = EncryptedEnvelope::try_from(&req.sealed)?;

    let recorded = state
        .pipeline()
        .record_envelope_until(&req.identity_handle, &envelope, state.shutdown())
        .await?;

    Ok((http::StatusCode::OK, Json(recorded)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(#[from] EnvelopeError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError<sqlx::Error>),
}

impl IntoResponse for RecordError {
    fn into_response(self) -> Response {
        use http::StatusCode;

        let status = match &self {
            RecordError::InvalidEnvelope(_) => StatusCode::BAD_REQUEST,
            RecordError::Pipeline(e) => match e {
                PipelineError::Process(_) => StatusCode::BAD_REQUEST,
                PipelineError::Publish(e) => match e {
                    PublishError::Unavailable(_)
                    | PublishError::TimedOut(_)
                    | PublishError::InvalidContentId(_) => StatusCode::BAD_GATEWAY,
                    PublishError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    PublishError::Envelope(_) => StatusCode::BAD_REQUEST,
                    PublishError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                },
                PipelineError::Ledger(LedgerError::UnknownIdentity(_)) => StatusCode::NOT_FOUND,
                PipelineError::Ledger(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
        };

        if status.is_server_error() {
            tracing::error!("RECORD DOCUMENT ERROR: {}", self);
        } else {
            tracing::warn!("RECORD DOCUMENT REJECTED: {}", self);
        }

        (status, self.to_string()).into_response()
    }
}

impl ApiRequest for RecordRequest {
    type Response = RecordedDocument;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/document/record")?;
        Ok(client.post(full_url).json(&self))
    }
}
