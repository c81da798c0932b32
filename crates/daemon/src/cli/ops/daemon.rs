use std::time::Duration;

use clap::Args;

use docseal_daemon::state::AppState;
use docseal_daemon::{spawn_service, ServiceConfig, ServiceError};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,

    /// Use an in-memory ledger instead of the on-disk database
    #[arg(long, default_value_t = false)]
    pub ephemeral: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] docseal_daemon::state::StateError),

    #[error("daemon failed: {0}")]
    Failed(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.docseal)
        let state = AppState::load(ctx.config_path.clone())?;

        let sqlite_path = if self.ephemeral {
            None
        } else {
            Some(state.db_path)
        };

        let config = ServiceConfig {
            api_port: self.api_port.unwrap_or(state.config.api_port),
            sqlite_path,
            publisher: state.config.publisher,
            publish_timeout: Duration::from_secs(state.config.publish_timeout_secs),
            ledger_timeout: Duration::from_secs(state.config.ledger_timeout_secs),
            max_payload_bytes: state.config.max_payload_bytes,
            key_export: state.config.key_export,
            log_level: tracing::Level::DEBUG,
            log_dir: self.log_dir.clone(),
        };

        spawn_service(&config).await?;
        Ok("daemon ended".to_string())
    }
}
