use clap::Args;

use common::build_info;

#[derive(Args, Debug, Clone)]
pub struct Version {
    /// Also print the daemon's build info
    #[arg(long, default_value_t = false)]
    pub daemon: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("failed to reach the daemon: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid daemon url: {0}")]
    Url(#[from] url::ParseError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Version {
    type Error = VersionError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let local = build_info!().to_string();
        if !self.daemon {
            return Ok(local);
        }

        let url = ctx.client.base_url().join("/_status/version")?;
        let daemon: serde_json::Value = ctx
            .client
            .http_client()
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(format!("cli:    {}\ndaemon: {}", local, daemon))
    }
}
