use async_trait::async_trait;
use url::Url;

use common::content::{ContentId, ContentStore, MemoryContentStore, PinningAuth, PinningClient};
use common::prelude::PublishError;

use crate::state::PublisherConfig;

/// Content store selected by configuration
#[derive(Debug, Clone)]
pub enum ServiceStore {
    Memory(MemoryContentStore),
    Pinning(PinningClient),
}

impl ServiceStore {
    pub fn from_config(
        config: &PublisherConfig,
        max_payload_bytes: usize,
    ) -> Result<Self, ContentStoreSetupError> {
        match config {
            PublisherConfig::Memory => Ok(Self::Memory(MemoryContentStore::with_max_payload(
                max_payload_bytes,
            ))),
            PublisherConfig::Pinata {
                endpoint,
                jwt,
                api_key,
                api_secret,
            } => {
                let endpoint = Url::parse(endpoint)?;
                let auth = match (jwt, api_key, api_secret) {
                    (Some(jwt), _, _) => PinningAuth::Jwt(jwt.clone()),
                    (None, Some(key), Some(secret)) => PinningAuth::ApiKey {
                        key: key.clone(),
                        secret: secret.clone(),
                    },
                    _ => return Err(ContentStoreSetupError::MissingCredentials),
                };
                Ok(Self::Pinning(PinningClient::new(endpoint, auth)))
            }
        }
    }
}

#[async_trait]
impl ContentStore for ServiceStore {
    async fn put(&self, payload: Vec<u8>) -> Result<ContentId, PublishError> {
        match self {
            Self::Memory(store) => store.put(payload).await,
            Self::Pinning(client) => client.put(payload).await,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentStoreSetupError {
    #[error("invalid pinning endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("pinning publisher needs either a jwt or an api_key and api_secret pair")]
    MissingCredentials,
}
