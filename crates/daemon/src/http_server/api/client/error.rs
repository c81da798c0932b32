use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
}

impl ApiError {
    /// Status code returned by the daemon, if it answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::HttpStatus(status, _) => Some(*status),
            ApiError::Reqwest(e) => e.status(),
            ApiError::UrlParse(_) => None,
        }
    }
}
