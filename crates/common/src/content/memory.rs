use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::content_id::ContentId;
use super::store::{ContentStore, PublishError};

/// In-process content-addressed store
///
/// Identifiers are derived locally as CIDv1 over the payload bytes.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    inner: Arc<RwLock<HashMap<ContentId, Vec<u8>>>>,
    max_payload_bytes: Option<usize>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject payloads larger than `max_payload_bytes`
    pub fn with_max_payload(max_payload_bytes: usize) -> Self {
        Self {
            inner: Arc::default(),
            max_payload_bytes: Some(max_payload_bytes),
        }
    }

    pub fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, PublishError> {
        let inner = self.inner.read().map_err(|e| {
            PublishError::Unavailable(format!("failed to acquire read lock: {}", e))
        })?;
        Ok(inner.get(id).cloned())
    }

    pub fn contains(&self, id: &ContentId) -> Result<bool, PublishError> {
        let inner = self.inner.read().map_err(|e| {
            PublishError::Unavailable(format!("failed to acquire read lock: {}", e))
        })?;
        Ok(inner.contains_key(id))
    }

    pub fn len(&self) -> Result<usize, PublishError> {
        let inner = self.inner.read().map_err(|e| {
            PublishError::Unavailable(format!("failed to acquire read lock: {}", e))
        })?;
        Ok(inner.len())
    }

    pub fn is_empty(&self) -> Result<bool, PublishError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn put(&self, payload: Vec<u8>) -> Result<ContentId, PublishError> {
        if let Some(max) = self.max_payload_bytes {
            if payload.len() > max {
                return Err(PublishError::Rejected(format!(
                    "payload of {} bytes exceeds limit of {} bytes",
                    payload.len(),
                    max
                )));
            }
        }

        let id = ContentId::for_payload(&payload)?;
        let mut inner = self.inner.write().map_err(|e| {
            PublishError::Unavailable(format!("failed to acquire write lock: {}", e))
        })?;
        inner.entry(id.clone()).or_insert(payload);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryContentStore::new();
        let id = store.put(b"payload".to_vec()).await.unwrap();

        assert!(store.contains(&id).unwrap());
        assert_eq!(store.get(&id).unwrap(), Some(b"payload".to_vec()));
        assert_eq!(id, ContentId::for_payload(b"payload").unwrap());
    }

    #[tokio::test]
    async fn test_put_is_idempotent() {
        let store = MemoryContentStore::new();
        let a = store.put(b"same".to_vec()).await.unwrap();
        let b = store.put(b"same".to_vec()).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_size_limit() {
        let store = MemoryContentStore::with_max_payload(4);
        assert!(store.put(b"four".to_vec()).await.is_ok());

        let err = store.put(b"five!".to_vec()).await.unwrap_err();
        assert!(matches!(err, PublishError::Rejected(_)));
        assert!(!err.is_retryable());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let store = MemoryContentStore::new();
        let id = ContentId::for_payload(b"never stored").unwrap();
        assert!(!store.contains(&id).unwrap());
        assert_eq!(store.get(&id).unwrap(), None);
        assert!(store.is_empty().unwrap());
    }
}
