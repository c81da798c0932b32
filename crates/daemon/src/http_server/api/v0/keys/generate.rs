use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};

use common::crypto::{generate_all_keys, KeyError};

use crate::ServiceState;

/// Hand out a fresh identity keypair and content key
///
/// Refused unless `key_export` is enabled: the response carries private
/// key material.
#[tracing::instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, GenerateError> {
    if !state.key_export() {
        return Err(GenerateError::ExportDisabled);
    }

    let keys = generate_all_keys()?;
    tracing::info!(public_key = %keys.public_key, "generated key material for export");
    Ok((http::StatusCode::OK, Json(keys)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("key export is disabled on this daemon")]
    ExportDisabled,
    #[error("key generation failed: {0}")]
    Key(#[from] KeyError),
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        match self {
            GenerateError::ExportDisabled => {
                tracing::warn!("refused key export request");
                (http::StatusCode::FORBIDDEN, self.to_string()).into_response()
            }
            GenerateError::Key(e) => {
                tracing::error!("KEY GENERATION ERROR: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "key generation failed".to_string(),
                )
                    .into_response()
            }
        }
    }
}
