use std::path::PathBuf;

use clap::Args;

use common::ledger::IdentityHandle;
use docseal_daemon::http_server::api::client::ApiError;
use docseal_daemon::http_server::api::v0::document::{RecordRequest, SealedDocument};

use super::seal::{seal_file, SealError};
use super::KeySource;

/// Publish a sealed document and record it against an identity
///
/// Either pass a document sealed earlier with `--sealed`, or a plaintext
/// `--file` with a key to seal it on the fly. The key never leaves this
/// process.
#[derive(Args, Debug, Clone)]
pub struct Record {
    /// Registered identity handle
    #[arg(long)]
    pub identity_handle: IdentityHandle,

    /// Sealed document produced by `document seal`
    #[arg(long, conflicts_with = "file")]
    pub sealed: Option<PathBuf>,

    /// Plaintext file to seal before recording
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub key: KeySource,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("either --sealed or --file (with --key or --key-file) must be provided")]
    NoDocument,
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("invalid sealed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Seal(#[from] SealError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl Record {
    fn sealed_document(&self) -> Result<SealedDocument, RecordError> {
        match (&self.sealed, &self.file) {
            (Some(path), _) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| RecordError::Read(path.clone(), e))?;
                Ok(serde_json::from_str(&json)?)
            }
            (None, Some(file)) if self.key.is_set() => Ok(seal_file(file, &self.key)?),
            _ => Err(RecordError::NoDocument),
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Record {
    type Error = RecordError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let request = RecordRequest {
            identity_handle: self.identity_handle.clone(),
            sealed: self.sealed_document()?,
        };

        let recorded = ctx.client.call(request).await?;

        let status = if recorded.already_recorded {
            "already recorded"
        } else {
            "recorded"
        };
        Ok(format!(
            "cid:      {}\nhash:     {}\nposition: {} ({})",
            recorded.cid, recorded.hash, recorded.position, status
        ))
    }
}
