use std::time::Duration;

use tokio::sync::watch;

use super::content_id::ContentId;
use super::store::{ContentStore, PublishError};
use crate::document::EncryptedEnvelope;

/// Publishes sealed documents to a [`ContentStore`]
#[derive(Debug, Clone)]
pub struct ContentPublisher<S> {
    store: S,
    timeout: Option<Duration>,
}

impl<S: ContentStore> ContentPublisher<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            timeout: None,
        }
    }

    /// Bound every publish call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Publish the canonical payload of `envelope` and return its identifier
    ///
    /// Publishing byte-identical envelopes yields the same identifier.
    pub async fn publish(&self, envelope: &EncryptedEnvelope) -> Result<ContentId, PublishError> {
        let payload = envelope.canonical_payload()?;
        let size = payload.len();
        let put = self.store.put(payload);

        let id = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, put)
                .await
                .map_err(|_| PublishError::TimedOut(timeout))??,
            None => put.await?,
        };

        tracing::info!(
            cid = %id,
            digest = %envelope.plaintext_digest(),
            size,
            "published envelope"
        );
        Ok(id)
    }

    /// Like [`publish`](Self::publish), but gives up with
    /// [`PublishError::Cancelled`] as soon as `cancel` fires
    ///
    /// `cancel` fires when a value is sent or every sender is dropped.
    pub async fn publish_until(
        &self,
        envelope: &EncryptedEnvelope,
        mut cancel: watch::Receiver<()>,
    ) -> Result<ContentId, PublishError> {
        if !matches!(cancel.has_changed(), Ok(false)) {
            return Err(PublishError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.changed() => {
                tracing::debug!("publish cancelled");
                Err(PublishError::Cancelled)
            }
            result = self.publish(envelope) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryContentStore;
    use crate::crypto::ContentKey;
    use crate::document::process;
    use async_trait::async_trait;

    /// Store that never answers
    #[derive(Debug, Clone)]
    struct StalledStore;

    #[async_trait]
    impl ContentStore for StalledStore {
        async fn put(&self, _payload: Vec<u8>) -> Result<ContentId, PublishError> {
            std::future::pending().await
        }
    }

    fn envelope() -> EncryptedEnvelope {
        process(b"hello-world", &ContentKey::generate().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_publish_same_envelope_twice() {
        let publisher = ContentPublisher::new(MemoryContentStore::new());
        let envelope = envelope();

        let a = publisher.publish(&envelope).await.unwrap();
        let b = publisher.publish(&envelope).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(
            publisher.store().get(&a).unwrap(),
            Some(envelope.canonical_payload().unwrap())
        );
    }

    #[tokio::test]
    async fn test_distinct_envelopes_distinct_ids() {
        let publisher = ContentPublisher::new(MemoryContentStore::new());
        let a = publisher.publish(&envelope()).await.unwrap();
        let b = publisher.publish(&envelope()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_rejected_by_quota() {
        let publisher = ContentPublisher::new(MemoryContentStore::with_max_payload(8));
        let err = publisher.publish(&envelope()).await.unwrap_err();
        assert!(matches!(err, PublishError::Rejected(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let publisher = ContentPublisher::new(StalledStore).with_timeout(Duration::from_secs(5));
        let err = publisher.publish(&envelope()).await.unwrap_err();
        assert!(matches!(err, PublishError::TimedOut(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_cancel_while_publishing() {
        let publisher = ContentPublisher::new(StalledStore);
        let (tx, rx) = watch::channel(());
        let envelope = envelope();

        let handle = tokio::spawn(async move { publisher.publish_until(&envelope, rx).await });
        tokio::task::yield_now().await;
        tx.send(()).unwrap();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, PublishError::Cancelled));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_already_cancelled() {
        let publisher = ContentPublisher::new(MemoryContentStore::new());
        let (tx, rx) = watch::channel(());
        tx.send(()).unwrap();

        let err = publisher.publish_until(&envelope(), rx).await.unwrap_err();
        assert!(matches!(err, PublishError::Cancelled));
        assert!(publisher.store().is_empty().unwrap());
    }
}
