use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::ledger::{AppendOutcome, IdentityHandle, LedgerError, Reference};
use common::prelude::PipelineError;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
#[serde(rename_all = "camelCase")]
pub struct AppendRequest {
    /// Registered identity handle
    #[arg(long)]
    pub identity_handle: IdentityHandle,

    /// Reference to append, e.g. a CID or a transaction hash
    #[arg(long)]
    pub reference: Reference,
}

#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<AppendRequest>,
) -> Result<impl IntoResponse, AppendError> {
    let outcome = state
        .pipeline()
        .record_reference(&req.identity_handle, &req.reference)
        .await?;

    Ok((http::StatusCode::OK, Json(outcome)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum AppendError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError<sqlx::Error>),
}

impl IntoResponse for AppendError {
    fn into_response(self) -> Response {
        match self {
            AppendError::Pipeline(PipelineError::Ledger(LedgerError::UnknownIdentity(handle))) => (
                http::StatusCode::NOT_FOUND,
                format!("unknown identity: {}", handle),
            )
                .into_response(),
            AppendError::Pipeline(e) => {
                tracing::error!("APPEND REFERENCE ERROR: {}", e);
                (
                    http::StatusCode::SERVICE_UNAVAILABLE,
                    "ledger unavailable".to_string(),
                )
                    .into_response()
            }
        }
    }
}

impl ApiRequest for AppendRequest {
    type Response = AppendOutcome;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/identity/append")?;
        Ok(client.post(full_url).json(&self))
    }
}
