use std::fmt;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use super::content_id::ContentId;
use super::store::{ContentStore, PublishError};

/// Path of the JSON pin endpoint, relative to the service endpoint
pub const PIN_JSON_PATH: &str = "pinning/pinJSONToIPFS";

const API_KEY_HEADER: &str = "pinata_api_key";
const API_SECRET_HEADER: &str = "pinata_secret_api_key";

/// Credentials for a pinning service
#[derive(Clone)]
pub enum PinningAuth {
    /// Bearer token
    Jwt(String),
    /// Key and secret pair sent as headers
    ApiKey { key: String, secret: String },
}

impl fmt::Debug for PinningAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jwt(_) => f.write_str("Jwt(<redacted>)"),
            Self::ApiKey { .. } => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

#[derive(Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Content store backed by a Pinata-compatible pinning API
///
/// Payloads must be JSON. Each payload is wrapped as `{"pinataContent": …}`
/// and posted to `{endpoint}/pinning/pinJSONToIPFS`; the store answers with
/// the CID under `IpfsHash`.
#[derive(Clone)]
pub struct PinningClient {
    endpoint: Url,
    auth: PinningAuth,
    client: Client,
}

impl fmt::Debug for PinningClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinningClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("auth", &self.auth)
            .finish()
    }
}

impl PinningClient {
    pub fn new(endpoint: Url, auth: PinningAuth) -> Self {
        Self::with_client(endpoint, auth, Client::new())
    }

    pub fn with_client(mut endpoint: Url, auth: PinningAuth, client: Client) -> Self {
        // keep the last path segment when joining
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        Self {
            endpoint,
            auth,
            client,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn pin_url(&self) -> Result<Url, PublishError> {
        self.endpoint
            .join(PIN_JSON_PATH)
            .map_err(|e| PublishError::Rejected(format!("invalid pinning endpoint: {}", e)))
    }
}

#[async_trait]
impl ContentStore for PinningClient {
    async fn put(&self, payload: Vec<u8>) -> Result<ContentId, PublishError> {
        serde_json::from_slice::<serde::de::IgnoredAny>(&payload)
            .map_err(|e| PublishError::Rejected(format!("payload is not JSON: {}", e)))?;

        // splice the payload in untouched so the pinned bytes match ours
        let mut body = Vec::with_capacity(payload.len() + 20);
        body.extend_from_slice(b"{\"pinataContent\":");
        body.extend_from_slice(&payload);
        body.push(b'}');

        let request = self
            .client
            .post(self.pin_url()?)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let request = match &self.auth {
            PinningAuth::Jwt(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            PinningAuth::ApiKey { key, secret } => request
                .header(API_KEY_HEADER, key)
                .header(API_SECRET_HEADER, secret),
        };

        let response = request
            .send()
            .await
            .map_err(|e| PublishError::Unavailable(format!("pinning request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = body_text(response.text().await);
            tracing::warn!(%status, "pinning service refused payload");
            return Err(classify_status(status, text));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Unavailable(format!("unreadable pinning response: {}", e)))?;
        let id: ContentId = pinned.ipfs_hash.parse()?;
        tracing::debug!(cid = %id, "payload pinned");
        Ok(id)
    }
}

fn body_text(body: reqwest::Result<String>) -> String {
    body.unwrap_or_else(|e| format!("<body unreadable: {}>", e))
}

fn classify_status(status: StatusCode, body: String) -> PublishError {
    let message = format!("{}: {}", status, body);
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        PublishError::Unavailable(message)
    } else {
        PublishError::Rejected(message)
    }
}
