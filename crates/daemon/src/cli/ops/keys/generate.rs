use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use common::crypto::{generate_content_key, generate_identity_keys, EntropyUnavailable, KeyError};

/// Generate an identity keypair and a content key locally
///
/// Nothing is sent to the daemon.
#[derive(Args, Debug, Clone)]
pub struct Generate {
    /// Write the private key to this file as PEM instead of printing it
    #[arg(long)]
    pub pem_out: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateOutput {
    public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_key_pem: Option<String>,
    symmetric_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("key generation failed: {0}")]
    Key(#[from] KeyError),
    #[error("key generation failed: {0}")]
    Entropy(#[from] EntropyUnavailable),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("failed to encode keys: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Generate {
    type Error = GenerateError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let identity = generate_identity_keys()?;
        let content_key = generate_content_key()?;

        let (private_key, private_key_pem) = match &self.pem_out {
            Some(path) => {
                std::fs::write(path, identity.secret().to_pem())
                    .map_err(|e| GenerateError::Write(path.clone(), e))?;
                (None, Some(path.display().to_string()))
            }
            None => (Some(identity.export().private_key), None),
        };

        let output = GenerateOutput {
            public_key: identity.public().to_base64(),
            private_key,
            private_key_pem,
            symmetric_key: content_key.to_base64(),
        };

        Ok(serde_json::to_string_pretty(&output)?)
    }
}
