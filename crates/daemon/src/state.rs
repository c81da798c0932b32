use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "docseal";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";

/// Default public endpoint of the Pinata pinning API
pub const PINATA_ENDPOINT: &str = "https://api.pinata.cloud";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Upper bound on a single publish, in seconds
    #[serde(default = "default_publish_timeout_secs")]
    pub publish_timeout_secs: u64,
    /// Upper bound on a single ledger append, in seconds
    #[serde(default = "default_ledger_timeout_secs")]
    pub ledger_timeout_secs: u64,
    /// Largest payload the in-memory store accepts
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// Serve freshly generated key material over HTTP
    #[serde(default)]
    pub key_export: bool,
    /// Where sealed documents are published
    #[serde(default)]
    pub publisher: PublisherConfig,
}

fn default_api_port() -> u16 {
    5001
}

fn default_publish_timeout_secs() -> u64 {
    30
}

fn default_ledger_timeout_secs() -> u64 {
    10
}

fn default_max_payload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            publish_timeout_secs: default_publish_timeout_secs(),
            ledger_timeout_secs: default_ledger_timeout_secs(),
            max_payload_bytes: default_max_payload_bytes(),
            key_export: false,
            publisher: PublisherConfig::default(),
        }
    }
}

/// Content store backing the publisher.
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PublisherConfig {
    /// In-process store, lost on restart
    #[default]
    Memory,

    /// Pinata-compatible pinning service
    Pinata {
        /// Service endpoint (defaults to the public Pinata API)
        #[serde(default = "default_pinata_endpoint")]
        endpoint: String,
        /// Bearer token; takes precedence over the key pair
        jwt: Option<String>,
        /// API key, used together with `api_secret`
        api_key: Option<String>,
        /// API secret
        api_secret: Option<String>,
    },
}

fn default_pinata_endpoint() -> String {
    PINATA_ENDPOINT.to_string()
}

impl std::fmt::Debug for PublisherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublisherConfig::Memory => f.write_str("Memory"),
            PublisherConfig::Pinata {
                endpoint,
                jwt,
                api_key,
                ..
            } => f
                .debug_struct("Pinata")
                .field("endpoint", endpoint)
                .field("jwt", &jwt.as_ref().map(|_| "<redacted>"))
                .field("api_key", &api_key.as_ref().map(|_| "<redacted>"))
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the docseal directory (~/.docseal)
    pub docseal_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the docseal directory path (custom or default ~/.docseal)
    pub fn docseal_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new docseal state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let docseal_dir = Self::docseal_dir(custom_path)?;

        if docseal_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&docseal_dir)?;

        let config = config.unwrap_or_default();
        let config_path = docseal_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        // Empty database file, migrated when the service starts
        let db_path = docseal_dir.join(DB_FILE_NAME);
        fs::write(&db_path, "")?;

        Ok(Self {
            docseal_dir,
            db_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the docseal directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let docseal_dir = Self::docseal_dir(custom_path)?;

        if !docseal_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = docseal_dir.join(DB_FILE_NAME);
        let config_path = docseal_dir.join(CONFIG_FILE_NAME);

        if !db_path.exists() {
            return Err(StateError::MissingFile(DB_FILE_NAME.to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            docseal_dir,
            db_path,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("docseal directory not initialized. Run 'docseal init' first")]
    NotInitialized,

    #[error("docseal directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_load() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("state");

        let config = AppConfig {
            api_port: 6001,
            key_export: true,
            ..Default::default()
        };
        let state = AppState::init(Some(dir.clone()), Some(config.clone())).unwrap();
        assert!(state.db_path.exists());
        assert!(state.config_path.exists());

        let loaded = AppState::load(Some(dir)).unwrap();
        assert_eq!(loaded.config, config);
    }

    #[test]
    fn test_init_twice_fails() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("state");
        AppState::init(Some(dir.clone()), None).unwrap();
        assert!(matches!(
            AppState::init(Some(dir), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_uninitialized() {
        let temp = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppState::load(Some(temp.path().join("missing"))),
            Err(StateError::NotInitialized)
        ));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_port, 5001);
        assert_eq!(config.ledger_timeout_secs, 10);
        assert!(!config.key_export);
    }

    #[test]
    fn test_pinata_config() {
        let config: AppConfig = toml::from_str(
            r#"
            publish_timeout_secs = 10

            [publisher]
            type = "pinata"
            jwt = "secret-token"
            "#,
        )
        .unwrap();

        assert_eq!(config.publish_timeout_secs, 10);
        match &config.publisher {
            PublisherConfig::Pinata { endpoint, jwt, .. } => {
                assert_eq!(endpoint, PINATA_ENDPOINT);
                assert_eq!(jwt.as_deref(), Some("secret-token"));
            }
            other => panic!("unexpected publisher {:?}", other),
        }
        assert!(!format!("{:?}", config).contains("secret-token"));
    }
}
