use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use super::DatabaseSetupError;

pub async fn connect_sqlite(path: &Path) -> Result<SqlitePool, DatabaseSetupError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(DatabaseSetupError::Io)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(DatabaseSetupError::Unavailable)
}

/// A private in-memory database
///
/// Every connection to `:memory:` opens a fresh database, so the pool holds
/// exactly one connection and never recycles it.
pub async fn connect_sqlite_memory() -> Result<SqlitePool, DatabaseSetupError> {
    let options = SqliteConnectOptions::new()
        .filename(":memory:")
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(DatabaseSetupError::Unavailable)
}

pub async fn migrate_sqlite(pool: &SqlitePool) -> Result<(), DatabaseSetupError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(DatabaseSetupError::MigrationFailed)?;

    Ok(())
}
