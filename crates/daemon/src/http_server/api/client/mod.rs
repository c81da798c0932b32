use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

#[allow(clippy::module_inception)]
mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

/// A request the CLI can send to the daemon
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}
