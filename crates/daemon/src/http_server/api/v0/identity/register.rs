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
pub struct RegisterRequest {
    /// Handle to register, e.g. an email address
    #[arg(long)]
    pub identity_handle: IdentityHandle,

    /// Base64 encoded Ed25519 public key
    #[arg(long)]
    pub public_key: PublicKey,
}

#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, RegisterError> {
    state
        .database()
        .register_identity(&req.identity_handle, &req.public_key)
        .await?;
    tracing::info!(identity = %req.identity_handle, "registered identity");

    Ok((
        http::StatusCode::CREATED,
        Json(IdentityResponse {
            identity_handle: req.identity_handle,
            public_key: req.public_key,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError<sqlx::Error>),
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        match self {
            RegisterError::Ledger(LedgerError::AlreadyRegistered(handle)) => (
                http::StatusCode::CONFLICT,
                format!("identity already registered: {}", handle),
            )
                .into_response(),
            RegisterError::Ledger(e) => {
                tracing::error!("REGISTER IDENTITY ERROR: {}", e);
                (
                    http::StatusCode::SERVICE_UNAVAILABLE,
                    "ledger unavailable".to_string(),
                )
                    .into_response()
            }
        }
    }
}

impl ApiRequest for RegisterRequest {
    type Response = IdentityResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/identity/register")?;
        Ok(client.post(full_url).json(&self))
    }
}
