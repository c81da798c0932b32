use clap::Args;

use docseal_daemon::state::{AppConfig, AppState, PublisherConfig, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port
    #[arg(long, default_value_t = 5001)]
    pub api_port: u16,

    /// Publish to a Pinata-compatible pinning service instead of memory
    #[arg(long)]
    pub pinata_endpoint: Option<String>,

    /// Upper bound on a single publish, in seconds
    #[arg(long, default_value_t = 30)]
    pub publish_timeout_secs: u64,

    /// Allow the daemon to hand out generated key material over HTTP
    #[arg(long, default_value_t = false)]
    pub key_export: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("state error: {0}")]
    State(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Credentials are never taken on the command line; add them to
        // config.toml afterwards
        let publisher = match &self.pinata_endpoint {
            Some(endpoint) => PublisherConfig::Pinata {
                endpoint: endpoint.clone(),
                jwt: None,
                api_key: None,
                api_secret: None,
            },
            None => PublisherConfig::Memory,
        };

        let config = AppConfig {
            api_port: self.api_port,
            publisher,
            publish_timeout_secs: self.publish_timeout_secs,
            key_export: self.key_export,
            ..Default::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let mut output = format!(
            "Initialized docseal directory at {}\n  config: {}\n  database: {}",
            state.docseal_dir.display(),
            state.config_path.display(),
            state.db_path.display()
        );
        if self.pinata_endpoint.is_some() {
            output.push_str("\n  note: set jwt (or api_key and api_secret) under [publisher] in config.toml");
        }
        Ok(output)
    }
}
