use std::path::PathBuf;

use clap::{Args, Subcommand};

use common::crypto::{ContentKey, ContentKeyError};

pub mod open;
pub mod record;
pub mod seal;

use crate::cli::op::Op;

crate::command_enum! {
    (Seal, seal::Seal),
    (Open, open::Open),
    (Record, record::Record),
}

pub type DocumentCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Document {
    #[command(subcommand)]
    pub command: DocumentCommand,
}

#[async_trait::async_trait]
impl Op for Document {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

/// Where the base64 content key comes from
#[derive(Args, Debug, Clone)]
pub struct KeySource {
    /// Base64 encoded content key
    #[arg(long, group = "content_key")]
    pub key: Option<String>,

    /// File holding the base64 encoded content key
    #[arg(long, group = "content_key")]
    pub key_file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum KeySourceError {
    #[error("either --key or --key-file must be provided")]
    Missing,
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("invalid content key: {0}")]
    Invalid(#[from] ContentKeyError),
}

impl KeySource {
    pub fn is_set(&self) -> bool {
        self.key.is_some() || self.key_file.is_some()
    }

    /// The key exactly as supplied, still base64 encoded
    pub fn encoded(&self) -> Result<String, KeySourceError> {
        match (&self.key, &self.key_file) {
            (Some(key), _) => Ok(key.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map(|s| s.trim().to_string())
                .map_err(|e| KeySourceError::Read(path.clone(), e)),
            (None, None) => Err(KeySourceError::Missing),
        }
    }

    pub fn load(&self) -> Result<ContentKey, KeySourceError> {
        Ok(ContentKey::from_base64(&self.encoded()?)?)
    }
}
