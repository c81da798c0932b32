use std::path::PathBuf;
use std::time::Duration;

use crate::state::PublisherConfig;

#[derive(Debug)]
pub struct Config {
    // http server configuration
    /// Port for the API HTTP server
    pub api_port: u16,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,

    // publishing
    /// Content store sealed documents are published to
    pub publisher: PublisherConfig,
    /// Upper bound on a single publish
    pub publish_timeout: Duration,
    /// Upper bound on a single ledger append
    pub ledger_timeout: Duration,
    /// Largest payload the in-memory store accepts
    pub max_payload_bytes: usize,

    /// Whether `POST /api/v0/keys/generate` hands out key material
    pub key_export: bool,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_port: 5001,
            sqlite_path: None,
            publisher: PublisherConfig::Memory,
            publish_timeout: Duration::from_secs(30),
            ledger_timeout: Duration::from_secs(10),
            max_payload_bytes: 10 * 1024 * 1024,
            key_export: false,
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}
