use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use super::types::{AppendOutcome, IdentityHandle, IdentityRecord, Reference};
use crate::crypto::PublicKey;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError<T> {
    /// The backing store failed; the caller may retry
    #[error("ledger persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] T),
    /// No public key has ever been bound to this handle
    #[error("unknown identity: {0}")]
    UnknownIdentity(IdentityHandle),
    /// A key is already bound and the caller asked for a fresh registration
    #[error("identity already registered: {0}")]
    AlreadyRegistered(IdentityHandle),
    /// The call did not finish in time; whether it took effect is unknown
    #[error("ledger call timed out after {0:?}")]
    TimedOut(Duration),
    /// The call was abandoned; whether it took effect is unknown
    #[error("ledger call cancelled")]
    Cancelled,
}

/// Binds identity handles to a public key and an append-only reference log
///
/// An identity is created by its first [`bind_public_key`](Self::bind_public_key).
/// The key is a single slot and the last bind wins. The log only grows:
/// entries are never reordered, edited or removed, and a reference appears
/// at most once per identity.
#[async_trait]
pub trait IdentityLedger: Send + Sync + Debug + Clone + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Register `handle` with `public_key`, or replace its current key
    ///
    /// Never touches the log.
    async fn bind_public_key(
        &self,
        handle: &IdentityHandle,
        public_key: &PublicKey,
    ) -> Result<(), LedgerError<Self::Error>>;

    /// Register `handle` with `public_key` only if it is not registered yet
    ///
    /// The check and the insert are one atomic step, so of two racing
    /// registrations exactly one succeeds and the other fails with
    /// [`LedgerError::AlreadyRegistered`].
    async fn register_identity(
        &self,
        handle: &IdentityHandle,
        public_key: &PublicKey,
    ) -> Result<(), LedgerError<Self::Error>>;

    /// Replace the key of an already registered identity
    ///
    /// Fails with [`LedgerError::UnknownIdentity`] instead of creating it.
    async fn rotate_public_key(
        &self,
        handle: &IdentityHandle,
        public_key: &PublicKey,
    ) -> Result<(), LedgerError<Self::Error>>;

    /// Append `reference` to the end of the identity's log
    ///
    /// Concurrent appends to the same identity are serialized: each new
    /// reference gets a distinct position and none is lost. Appending a
    /// reference that is already in the log is not an error and leaves the
    /// log unchanged.
    ///
    /// Fails with [`LedgerError::UnknownIdentity`] if no key is bound.
    async fn append_reference(
        &self,
        handle: &IdentityHandle,
        reference: &Reference,
    ) -> Result<AppendOutcome, LedgerError<Self::Error>>;

    /// The identity's log in append order
    async fn read_log(
        &self,
        handle: &IdentityHandle,
    ) -> Result<Vec<Reference>, LedgerError<Self::Error>>;

    async fn exists(&self, handle: &IdentityHandle) -> Result<bool, LedgerError<Self::Error>>;

    /// The currently bound key
    async fn public_key(
        &self,
        handle: &IdentityHandle,
    ) -> Result<PublicKey, LedgerError<Self::Error>>;

    /// Handles of every registered identity, sorted
    async fn list_identities(&self) -> Result<Vec<IdentityHandle>, LedgerError<Self::Error>>;

    /// Position of `reference` in the identity's log, if present
    async fn contains(
        &self,
        handle: &IdentityHandle,
        reference: &Reference,
    ) -> Result<Option<u64>, LedgerError<Self::Error>> {
        Ok(self
            .read_log(handle)
            .await?
            .iter()
            .position(|r| r == reference)
            .map(|p| p as u64))
    }

    /// Key and log together
    async fn record(
        &self,
        handle: &IdentityHandle,
    ) -> Result<IdentityRecord, LedgerError<Self::Error>> {
        let public_key = self.public_key(handle).await?;
        let log = self.read_log(handle).await?;
        Ok(IdentityRecord {
            handle: handle.clone(),
            public_key,
            log,
        })
    }
}
