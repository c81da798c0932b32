use std::time::Duration;

use tokio::sync::watch;

use common::prelude::{ContentPublisher, DocumentPipeline};

use crate::content_store::{ContentStoreSetupError, ServiceStore};
use crate::database::{Database, DatabaseSetupError};
use crate::ServiceConfig;

pub type Pipeline = DocumentPipeline<ServiceStore, Database>;

/// Shared state handed to every request handler
#[derive(Clone, Debug)]
pub struct State {
    database: Database,
    pipeline: Pipeline,
    key_export: bool,
    shutdown_rx: watch::Receiver<()>,
}

impl State {
    pub async fn from_config(
        config: &ServiceConfig,
        shutdown_rx: watch::Receiver<()>,
    ) -> Result<Self, StateSetupError> {
        let database = match &config.sqlite_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "opening sqlite ledger");
                Database::connect(path).await?
            }
            None => {
                tracing::warn!("no sqlite path configured, using an in-memory ledger");
                Database::memory().await?
            }
        };

        let store = ServiceStore::from_config(&config.publisher, config.max_payload_bytes)?;
        tracing::info!(publisher = ?config.publisher, "content publisher configured");

        Ok(Self::new(
            database,
            store,
            config.publish_timeout,
            config.ledger_timeout,
            config.key_export,
            shutdown_rx,
        ))
    }

    pub fn new(
        database: Database,
        store: ServiceStore,
        publish_timeout: Duration,
        ledger_timeout: Duration,
        key_export: bool,
        shutdown_rx: watch::Receiver<()>,
    ) -> Self {
        let publisher = ContentPublisher::new(store).with_timeout(publish_timeout);
        let pipeline =
            DocumentPipeline::new(publisher, database.clone()).with_ledger_timeout(ledger_timeout);
        Self {
            database,
            pipeline,
            key_export,
            shutdown_rx,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn key_export(&self) -> bool {
        self.key_export
    }

    /// Receiver that fires when the service starts shutting down
    pub fn shutdown(&self) -> watch::Receiver<()> {
        self.shutdown_rx.clone()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_rx.has_changed().unwrap_or(true)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to setup the database: {0}")]
    Database(#[from] DatabaseSetupError),

    #[error("failed to setup the content publisher: {0}")]
    ContentStore(#[from] ContentStoreSetupError),
}
