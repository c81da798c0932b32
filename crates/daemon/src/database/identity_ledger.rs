use std::str::FromStr;

use async_trait::async_trait;
use sqlx::Row;

use common::ledger::{AppendOutcome, IdentityHandle, IdentityLedger, LedgerError, Reference};
use common::prelude::PublicKey;

use crate::database::{types::DPublicKey, Database};

type Result<T> = std::result::Result<T, LedgerError<sqlx::Error>>;

fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

impl Database {
    async fn position_of(
        &self,
        handle: &IdentityHandle,
        reference: &Reference,
    ) -> Result<Option<u64>> {
        let row = sqlx::query(
            r#"
            SELECT position
            FROM identity_log
            WHERE identity_handle = $1 AND reference = $2
            "#,
        )
        .bind(handle.as_str())
        .bind(reference.as_str())
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(|r| r.get::<i64, _>("position") as u64))
    }
}

#[async_trait]
impl IdentityLedger for Database {
    type Error = sqlx::Error;

    async fn bind_public_key(&self, handle: &IdentityHandle, public_key: &PublicKey) -> Result<()> {
        let _guard = self.writer().lock().await;

        sqlx::query(
            r#"
            INSERT INTO identities (handle, public_key)
            VALUES ($1, $2)
            ON CONFLICT(handle) DO UPDATE SET
                public_key = excluded.public_key,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(handle.as_str())
        .bind(DPublicKey::from(*public_key))
        .execute(&**self)
        .await?;

        Ok(())
    }

    async fn register_identity(
        &self,
        handle: &IdentityHandle,
        public_key: &PublicKey,
    ) -> Result<()> {
        let _guard = self.writer().lock().await;

        let inserted = sqlx::query(
            r#"
            INSERT INTO identities (handle, public_key)
            VALUES ($1, $2)
            ON CONFLICT(handle) DO NOTHING
            RETURNING handle
            "#,
        )
        .bind(handle.as_str())
        .bind(DPublicKey::from(*public_key))
        .fetch_optional(&**self)
        .await?;

        match inserted {
            Some(_) => Ok(()),
            None => Err(LedgerError::AlreadyRegistered(handle.clone())),
        }
    }

    async fn rotate_public_key(
        &self,
        handle: &IdentityHandle,
        public_key: &PublicKey,
    ) -> Result<()> {
        let _guard = self.writer().lock().await;

        let result = sqlx::query(
            r#"
            UPDATE identities
            SET public_key = $2, updated_at = CURRENT_TIMESTAMP
            WHERE handle = $1
            "#,
        )
        .bind(handle.as_str())
        .bind(DPublicKey::from(*public_key))
        .execute(&**self)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::UnknownIdentity(handle.clone()));
        }
        Ok(())
    }

    async fn append_reference(
        &self,
        handle: &IdentityHandle,
        reference: &Reference,
    ) -> Result<AppendOutcome> {
        let _guard = self.writer().lock().await;

        if !self.exists(handle).await? {
            return Err(LedgerError::UnknownIdentity(handle.clone()));
        }

        // Position is computed and claimed in one statement; the unique
        // (identity_handle, reference) constraint turns a repeat into a no-op.
        let inserted = sqlx::query(
            r#"
            INSERT INTO identity_log (identity_handle, position, reference)
            SELECT $1, COALESCE(MAX(position) + 1, 0), $2
            FROM identity_log
            WHERE identity_handle = $1
            ON CONFLICT(identity_handle, reference) DO NOTHING
            RETURNING position
            "#,
        )
        .bind(handle.as_str())
        .bind(reference.as_str())
        .fetch_optional(&**self)
        .await?;

        if let Some(row) = inserted {
            let position = row.get::<i64, _>("position") as u64;
            return Ok(AppendOutcome::Appended { position });
        }

        match self.position_of(handle, reference).await? {
            Some(position) => Ok(AppendOutcome::AlreadyRecorded { position }),
            None => Err(LedgerError::PersistenceUnavailable(sqlx::Error::RowNotFound)),
        }
    }

    async fn read_log(&self, handle: &IdentityHandle) -> Result<Vec<Reference>> {
        if !self.exists(handle).await? {
            return Err(LedgerError::UnknownIdentity(handle.clone()));
        }

        let rows = sqlx::query(
            r#"
            SELECT reference
            FROM identity_log
            WHERE identity_handle = $1
            ORDER BY position ASC
            "#,
        )
        .bind(handle.as_str())
        .fetch_all(&**self)
        .await?;

        rows.iter()
            .map(|row| {
                let reference: String = row.get("reference");
                Reference::from_str(&reference)
                    .map_err(|e| LedgerError::PersistenceUnavailable(decode_error(e)))
            })
            .collect()
    }

    async fn exists(&self, handle: &IdentityHandle) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM identities
            WHERE handle = $1
            "#,
        )
        .bind(handle.as_str())
        .fetch_one(&**self)
        .await?;

        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn public_key(&self, handle: &IdentityHandle) -> Result<PublicKey> {
        let row = sqlx::query(
            r#"
            SELECT public_key
            FROM identities
            WHERE handle = $1
            "#,
        )
        .bind(handle.as_str())
        .fetch_optional(&**self)
        .await?;

        match row {
            Some(row) => {
                let key: DPublicKey = row.try_get("public_key")?;
                Ok(key.into())
            }
            None => Err(LedgerError::UnknownIdentity(handle.clone())),
        }
    }

    async fn list_identities(&self) -> Result<Vec<IdentityHandle>> {
        let rows = sqlx::query(
            r#"
            SELECT handle
            FROM identities
            ORDER BY handle ASC
            "#,
        )
        .fetch_all(&**self)
        .await?;

        rows.iter()
            .map(|row| {
                let handle: String = row.get("handle");
                IdentityHandle::from_str(&handle)
                    .map_err(|e| LedgerError::PersistenceUnavailable(decode_error(e)))
            })
            .collect()
    }

    async fn contains(
        &self,
        handle: &IdentityHandle,
        reference: &Reference,
    ) -> Result<Option<u64>> {
        if !self.exists(handle).await? {
            return Err(LedgerError::UnknownIdentity(handle.clone()));
        }
        self.position_of(handle, reference).await
    }
}
