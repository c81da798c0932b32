use std::path::PathBuf;

use clap::Args;

use common::document::{open, EncryptedEnvelope, EnvelopeError, ProcessError};
use docseal_daemon::http_server::api::v0::document::SealedDocument;

use super::{KeySource, KeySourceError};

/// Decrypt a sealed document locally and check its digest
#[derive(Args, Debug, Clone)]
pub struct Open {
    /// Sealed document produced by `document seal`
    #[arg(long)]
    pub sealed: PathBuf,

    #[command(flatten)]
    pub key: KeySource,

    /// Write the plaintext here instead of printing it
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("invalid sealed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid envelope: {0}")]
    Envelope(#[from] EnvelopeError),
    #[error(transparent)]
    Key(#[from] KeySourceError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("plaintext is not UTF-8, use --out to write it to a file")]
    Binary,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Open {
    type Error = OpenError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let json = std::fs::read_to_string(&self.sealed)
            .map_err(|e| OpenError::Read(self.sealed.clone(), e))?;
        let sealed: SealedDocument = serde_json::from_str(&json)?;
        let envelope = EncryptedEnvelope::try_from(&sealed)?;

        let plaintext = open(&envelope, &self.key.load()?)?;

        match &self.out {
            Some(out) => {
                std::fs::write(out, &plaintext).map_err(|e| OpenError::Write(out.clone(), e))?;
                Ok(format!("Opened {} into {}", self.sealed.display(), out.display()))
            }
            None => String::from_utf8(plaintext).map_err(|_| OpenError::Binary),
        }
    }
}
