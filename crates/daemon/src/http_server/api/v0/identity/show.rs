use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::ledger::{IdentityHandle, IdentityLedger, LedgerError, Reference};
use common::prelude::PublicKey;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
#[serde(rename_all = "camelCase")]
pub struct ShowRequest {
    /// Registered identity handle
    #[arg(long)]
    pub identity_handle: IdentityHandle,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShowResponse {
    pub identity_handle: IdentityHandle,
    pub public_key: PublicKey,
    /// The identity's log in append order
    pub transactions: Vec<Reference>,
}

#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<ShowRequest>,
) -> Result<impl IntoResponse, ShowError> {
    let record = state.database().record(&req.identity_handle).await?;

    Ok((
        http::StatusCode::OK,
        Json(ShowResponse {
            identity_handle: record.handle,
            public_key: record.public_key,
            transactions: record.log,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ShowError {
    #[error(transparent)]
    Ledger(#[from] LedgerError<sqlx::Error>),
}

impl IntoResponse for ShowError {
    fn into_response(self) -> Response {
        match self {
            ShowError::Ledger(LedgerError::UnknownIdentity(handle)) => (
                http::StatusCode::NOT_FOUND,
                format!("unknown identity: {}", handle),
            )
                .into_response(),
            ShowError::Ledger(e) => {
                tracing::error!("SHOW IDENTITY ERROR: {}", e);
                (
                    http::StatusCode::SERVICE_UNAVAILABLE,
                    "ledger unavailable".to_string(),
                )
                    .into_response()
            }
        }
    }
}

impl ApiRequest for ShowRequest {
    type Response = ShowResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/identity/show")?;
        Ok(client.post(full_url).json(&self))
    }
}
