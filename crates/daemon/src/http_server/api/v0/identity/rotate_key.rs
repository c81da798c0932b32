use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::ledger::{IdentityHandle, IdentityLedger, LedgerError};
use common::prelude::PublicKey;

use super::IdentityResponse;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
#[serde(rename_all = "camelCase")]
pub struct RotateKeyRequest {
    /// Registered identity handle
    #[arg(long)]
    pub identity_handle: IdentityHandle,

    /// Base64 encoded Ed25519 public key replacing the current one
    #[arg(long)]
    pub public_key: PublicKey,
}

/// Replace an identity's public key. The transaction log is untouched and
/// the previous key is not kept.
#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<RotateKeyRequest>,
) -> Result<impl IntoResponse, RotateKeyError> {
    state
        .database()
        .rotate_public_key(&req.identity_handle, &req.public_key)
        .await?;
    tracing::info!(identity = %req.identity_handle, "rotated public key");

    Ok((
        http::StatusCode::OK,
        Json(IdentityResponse {
            identity_handle: req.identity_handle,
            public_key: req.public_key,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum RotateKeyError {
    #[error(transparent)]
    Ledger(#[from] LedgerError<sqlx::Error>),
}

impl IntoResponse for RotateKeyError {
    fn into_response(self) -> Response {
        match self {
            RotateKeyError::Ledger(LedgerError::UnknownIdentity(handle)) => (
                http::StatusCode::NOT_FOUND,
                format!("unknown identity: {}", handle),
            )
                .into_response(),
            RotateKeyError::Ledger(e) => {
                tracing::error!("ROTATE KEY ERROR: {}", e);
                (
                    http::StatusCode::SERVICE_UNAVAILABLE,
                    "ledger unavailable".to_string(),
                )
                    .into_response()
            }
        }
    }
}

impl ApiRequest for RotateKeyRequest {
    type Response = IdentityResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/identity/rotate-key")?;
        Ok(client.post(full_url).json(&self))
    }
}
