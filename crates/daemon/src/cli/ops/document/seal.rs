use std::path::{Path, PathBuf};

use clap::Args;

use common::document::{process_encoded, ProcessError};
use docseal_daemon::http_server::api::v0::document::SealedDocument;

use super::{KeySource, KeySourceError};

/// Encrypt a file locally into a sealed document
#[derive(Args, Debug, Clone)]
pub struct Seal {
    /// File to seal
    #[arg(long)]
    pub file: PathBuf,

    #[command(flatten)]
    pub key: KeySource,

    /// Write the sealed document here instead of printing it
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum SealError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error(transparent)]
    Key(#[from] KeySourceError),
    #[error("failed to seal document: {0}")]
    Process(#[from] ProcessError),
    #[error("failed to encode sealed document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read and seal `file` under the encoded key
pub fn seal_file(file: &Path, key: &KeySource) -> Result<SealedDocument, SealError> {
    let plaintext = std::fs::read(file).map_err(|e| SealError::Read(file.to_path_buf(), e))?;
    let envelope = process_encoded(&plaintext, &key.encoded()?)?;
    Ok(SealedDocument::from(&envelope))
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Seal {
    type Error = SealError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let sealed = seal_file(&self.file, &self.key)?;
        let json = serde_json::to_string_pretty(&sealed)?;

        match &self.out {
            Some(out) => {
                std::fs::write(out, json).map_err(|e| SealError::Write(out.clone(), e))?;
                Ok(format!(
                    "Sealed {} (sha256 {}) into {}",
                    self.file.display(),
                    sealed.hash,
                    out.display()
                ))
            }
            None => Ok(json),
        }
    }
}
