mod identity_ledger;
mod sqlite;
mod types;

use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

/// The daemon's SQLite ledger
///
/// Reads go straight to the pool. Writes additionally take `writer`, so the
/// daemon never races itself for SQLite's single write lock.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

impl Database {
    /// Open (creating if needed) and migrate the database at `path`
    pub async fn connect(path: &Path) -> Result<Self, DatabaseSetupError> {
        let pool = sqlite::connect_sqlite(path).await?;
        sqlite::migrate_sqlite(&pool).await?;
        Ok(Database::new(pool))
    }

    /// A fresh, migrated in-memory database
    pub async fn memory() -> Result<Self, DatabaseSetupError> {
        let pool = sqlite::connect_sqlite_memory().await?;
        sqlite::migrate_sqlite(&pool).await?;
        Ok(Database::new(pool))
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub(crate) fn writer(&self) -> &Mutex<()> {
        &self.writer
    }
}

impl Deref for Database {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseSetupError {
    #[error("error occurred while attempting database migration: {0}")]
    MigrationFailed(sqlx::migrate::MigrateError),

    #[error("unable to perform initial connection and check of the database: {0}")]
    Unavailable(sqlx::Error),

    #[error("unable to create the database directory: {0}")]
    Io(std::io::Error),
}
