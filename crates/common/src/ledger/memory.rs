use async_trait::async_trait;
use std::collections::{hash_map, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::provider::{IdentityLedger, LedgerError};
use super::types::{AppendOutcome, IdentityHandle, IdentityRecord, Reference};
use crate::crypto::PublicKey;

/// In-memory identity ledger
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<RwLock<MemoryLedgerInner>>,
}

#[derive(Debug, Default)]
struct MemoryLedgerInner {
    identities: HashMap<IdentityHandle, Entry>,
}

#[derive(Debug)]
struct Entry {
    public_key: PublicKey,
    log: Vec<Reference>,
    /// reference -> position in `log`
    index: HashMap<Reference, u64>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryLedgerError {
    #[error("memory ledger error: {0}")]
    Internal(String),
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<RwLockReadGuard<'_, MemoryLedgerInner>, LedgerError<MemoryLedgerError>> {
        self.inner.read().map_err(|e| {
            LedgerError::PersistenceUnavailable(MemoryLedgerError::Internal(format!(
                "failed to acquire read lock: {}",
                e
            )))
        })
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, MemoryLedgerInner>, LedgerError<MemoryLedgerError>> {
        self.inner.write().map_err(|e| {
            LedgerError::PersistenceUnavailable(MemoryLedgerError::Internal(format!(
                "failed to acquire write lock: {}",
                e
            )))
        })
    }
}

#[async_trait]
impl IdentityLedger for MemoryLedger {
    type Error = MemoryLedgerError;

    async fn bind_public_key(
        &self,
        handle: &IdentityHandle,
        public_key: &PublicKey,
    ) -> Result<(), LedgerError<Self::Error>> {
        let mut inner = self.write()?;
        inner
            .identities
            .entry(handle.clone())
            .and_modify(|entry| entry.public_key = *public_key)
            .or_insert_with(|| Entry {
                public_key: *public_key,
                log: Vec::new(),
                index: HashMap::new(),
            });
        Ok(())
    }

    async fn register_identity(
        &self,
        handle: &IdentityHandle,
        public_key: &PublicKey,
    ) -> Result<(), LedgerError<Self::Error>> {
        let mut inner = self.write()?;
        match inner.identities.entry(handle.clone()) {
            hash_map::Entry::Occupied(_) => Err(LedgerError::AlreadyRegistered(handle.clone())),
            hash_map::Entry::Vacant(slot) => {
                slot.insert(Entry {
                    public_key: *public_key,
                    log: Vec::new(),
                    index: HashMap::new(),
                });
                Ok(())
            }
        }
    }

    async fn rotate_public_key(
        &self,
        handle: &IdentityHandle,
        public_key: &PublicKey,
    ) -> Result<(), LedgerError<Self::Error>> {
        let mut inner = self.write()?;
        let entry = inner
            .identities
            .get_mut(handle)
            .ok_or_else(|| LedgerError::UnknownIdentity(handle.clone()))?;
        entry.public_key = *public_key;
        Ok(())
    }

    async fn append_reference(
        &self,
        handle: &IdentityHandle,
        reference: &Reference,
    ) -> Result<AppendOutcome, LedgerError<Self::Error>> {
        // check and insert under one write lock
        let mut inner = self.write()?;
        let entry = inner
            .identities
            .get_mut(handle)
            .ok_or_else(|| LedgerError::UnknownIdentity(handle.clone()))?;

        if let Some(position) = entry.index.get(reference) {
            return Ok(AppendOutcome::AlreadyRecorded {
                position: *position,
            });
        }

        let position = entry.log.len() as u64;
        entry.log.push(reference.clone());
        entry.index.insert(reference.clone(), position);
        Ok(AppendOutcome::Appended { position })
    }

    async fn read_log(
        &self,
        handle: &IdentityHandle,
    ) -> Result<Vec<Reference>, LedgerError<Self::Error>> {
        let inner = self.read()?;
        inner
            .identities
            .get(handle)
            .map(|entry| entry.log.clone())
            .ok_or_else(|| LedgerError::UnknownIdentity(handle.clone()))
    }

    async fn exists(&self, handle: &IdentityHandle) -> Result<bool, LedgerError<Self::Error>> {
        Ok(self.read()?.identities.contains_key(handle))
    }

    async fn public_key(
        &self,
        handle: &IdentityHandle,
    ) -> Result<PublicKey, LedgerError<Self::Error>> {
        let inner = self.read()?;
        inner
            .identities
            .get(handle)
            .map(|entry| entry.public_key)
            .ok_or_else(|| LedgerError::UnknownIdentity(handle.clone()))
    }

    async fn list_identities(&self) -> Result<Vec<IdentityHandle>, LedgerError<Self::Error>> {
        let inner = self.read()?;
        let mut handles: Vec<_> = inner.identities.keys().cloned().collect();
        handles.sort();
        Ok(handles)
    }

    async fn contains(
        &self,
        handle: &IdentityHandle,
        reference: &Reference,
    ) -> Result<Option<u64>, LedgerError<Self::Error>> {
        let inner = self.read()?;
        let entry = inner
            .identities
            .get(handle)
            .ok_or_else(|| LedgerError::UnknownIdentity(handle.clone()))?;
        Ok(entry.index.get(reference).copied())
    }

    async fn record(
        &self,
        handle: &IdentityHandle,
    ) -> Result<IdentityRecord, LedgerError<Self::Error>> {
        let inner = self.read()?;
        let entry = inner
            .identities
            .get(handle)
            .ok_or_else(|| LedgerError::UnknownIdentity(handle.clone()))?;
        Ok(IdentityRecord {
            handle: handle.clone(),
            public_key: entry.public_key,
            log: entry.log.clone(),
        })
    }
}
