use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::ServiceState;

#[async_trait]
pub trait DataSource {
    /// Perform any checks that ensure the service can handle requests
    async fn is_ready(&self) -> Result<(), DataSourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DataSourceError {
    #[error("one or more dependencies aren't available")]
    DependencyFailure,
    #[error("service is shutting down")]
    ShuttingDown,
}

/// Readiness backed by the ledger database and the shutdown signal
pub struct DbSource {
    state: ServiceState,
}

#[async_trait]
impl DataSource for DbSource {
    async fn is_ready(&self) -> Result<(), DataSourceError> {
        if self.state.is_shutting_down() {
            return Err(DataSourceError::ShuttingDown);
        }

        sqlx::query("SELECT 1")
            .execute(&**self.state.database())
            .await
            .map_err(|e| {
                tracing::warn!("database readiness check failed: {}", e);
                DataSourceError::DependencyFailure
            })?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct StateDataSource(Arc<dyn DataSource + Send + Sync>);

impl StateDataSource {
    pub fn new(inner: Arc<dyn DataSource + Send + Sync>) -> Self {
        Self(inner)
    }
}

impl std::fmt::Debug for StateDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StateDataSource")
    }
}

impl Deref for StateDataSource {
    type Target = Arc<dyn DataSource + Send + Sync>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StateDataSource
where
    ServiceState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ();

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(StateDataSource::new(Arc::new(DbSource {
            state: ServiceState::from_ref(state),
        })))
    }
}
