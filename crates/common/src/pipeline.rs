//! Document recording pipeline
//!
//! Seal, publish, then append. Each step runs only after the previous one
//! succeeded, so the ledger never points at content that was not published.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::content::{ContentId, ContentPublisher, ContentStore, PublishError};
use crate::crypto::ContentKey;
use crate::document::{self, ContentDigest, EncryptedEnvelope, ProcessError};
use crate::ledger::{AppendOutcome, IdentityHandle, IdentityLedger, LedgerError, Reference};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError<T: std::error::Error + 'static> {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Ledger(#[from] LedgerError<T>),
}

/// What a recorded document ended up as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedDocument {
    pub cid: ContentId,
    pub hash: ContentDigest,
    pub position: u64,
    pub already_recorded: bool,
}

impl RecordedDocument {
    fn new(cid: ContentId, hash: ContentDigest, outcome: AppendOutcome) -> Self {
        Self {
            cid,
            hash,
            position: outcome.position(),
            already_recorded: !outcome.is_new(),
        }
    }
}

/// Composes sealing, publishing and the identity ledger
#[derive(Debug, Clone)]
pub struct DocumentPipeline<S, L> {
    publisher: ContentPublisher<S>,
    ledger: L,
    ledger_timeout: Option<Duration>,
}

type PipelineResult<T, L> = Result<T, PipelineError<<L as IdentityLedger>::Error>>;

impl<S: ContentStore, L: IdentityLedger> DocumentPipeline<S, L> {
    pub fn new(publisher: ContentPublisher<S>, ledger: L) -> Self {
        Self {
            publisher,
            ledger,
            ledger_timeout: None,
        }
    }

    /// Bound every ledger append by `timeout`
    pub fn with_ledger_timeout(mut self, timeout: Duration) -> Self {
        self.ledger_timeout = Some(timeout);
        self
    }

    pub fn publisher(&self) -> &ContentPublisher<S> {
        &self.publisher
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Seal `plaintext` under `key`, publish it and append the CID to
    /// `handle`'s log
    ///
    /// Unknown identities are refused before anything is published.
    pub async fn record_document(
        &self,
        handle: &IdentityHandle,
        plaintext: &[u8],
        key: &ContentKey,
    ) -> PipelineResult<RecordedDocument, L> {
        self.ensure_registered(handle).await?;
        let envelope = document::process(plaintext, key)?;
        let cid = self.publisher.publish(&envelope).await?;
        self.append_published(handle, cid, &envelope, None).await
    }

    /// Publish an envelope sealed elsewhere and append its CID
    pub async fn record_envelope(
        &self,
        handle: &IdentityHandle,
        envelope: &EncryptedEnvelope,
    ) -> PipelineResult<RecordedDocument, L> {
        self.ensure_registered(handle).await?;
        let cid = self.publisher.publish(envelope).await?;
        self.append_published(handle, cid, envelope, None).await
    }

    /// [`record_document`](Self::record_document), abandoned as soon as
    /// `cancel` fires
    ///
    /// Firing before the content is published leaves the ledger untouched.
    /// Firing during the append yields [`LedgerError::Cancelled`]; the
    /// append may still have landed, and retrying is safe because a repeat
    /// is recorded once.
    pub async fn record_document_until(
        &self,
        handle: &IdentityHandle,
        plaintext: &[u8],
        key: &ContentKey,
        cancel: watch::Receiver<()>,
    ) -> PipelineResult<RecordedDocument, L> {
        self.ensure_registered(handle).await?;
        let envelope = document::process(plaintext, key)?;
        let cid = self.publisher.publish_until(&envelope, cancel.clone()).await?;
        self.append_published(handle, cid, &envelope, Some(cancel)).await
    }

    /// [`record_envelope`](Self::record_envelope), abandoned as soon as
    /// `cancel` fires; see [`record_document_until`](Self::record_document_until)
    pub async fn record_envelope_until(
        &self,
        handle: &IdentityHandle,
        envelope: &EncryptedEnvelope,
        cancel: watch::Receiver<()>,
    ) -> PipelineResult<RecordedDocument, L> {
        self.ensure_registered(handle).await?;
        let cid = self.publisher.publish_until(envelope, cancel.clone()).await?;
        self.append_published(handle, cid, envelope, Some(cancel)).await
    }

    /// Append a reference produced outside this pipeline, such as a
    /// transaction hash
    pub async fn record_reference(
        &self,
        handle: &IdentityHandle,
        reference: &Reference,
    ) -> PipelineResult<AppendOutcome, L> {
        self.append(handle, reference, None).await
    }

    async fn append(
        &self,
        handle: &IdentityHandle,
        reference: &Reference,
        cancel: Option<watch::Receiver<()>>,
    ) -> PipelineResult<AppendOutcome, L> {
        let bounded = async {
            let append = self.ledger.append_reference(handle, reference);
            match self.ledger_timeout {
                Some(timeout) => tokio::time::timeout(timeout, append)
                    .await
                    .unwrap_or_else(|_| Err(LedgerError::TimedOut(timeout))),
                None => append.await,
            }
        };

        let result = match cancel {
            Some(mut cancel) => {
                tokio::select! {
                    biased;
                    _ = cancel.changed() => {
                        tracing::debug!(identity = %handle, "append cancelled");
                        Err(LedgerError::Cancelled)
                    }
                    result = bounded => result,
                }
            }
            None => bounded.await,
        };

        let outcome = result?;
        tracing::info!(
            identity = %handle,
            reference = %reference,
            position = outcome.position(),
            new = outcome.is_new(),
            "recorded reference"
        );
        Ok(outcome)
    }

    async fn ensure_registered(&self, handle: &IdentityHandle) -> PipelineResult<(), L> {
        if !self.ledger.exists(handle).await? {
            return Err(LedgerError::UnknownIdentity(handle.clone()).into());
        }
        Ok(())
    }

    async fn append_published(
        &self,
        handle: &IdentityHandle,
        cid: ContentId,
        envelope: &EncryptedEnvelope,
        cancel: Option<watch::Receiver<()>>,
    ) -> PipelineResult<RecordedDocument, L> {
        let outcome = self.append(handle, &Reference::from(&cid), cancel).await?;
        Ok(RecordedDocument::new(
            cid,
            envelope.plaintext_digest().clone(),
            outcome,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryContentStore;
    use crate::crypto::{PublicKey, SecretKey};
    use crate::ledger::{MemoryLedger, MemoryLedgerError};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[derive(Debug, Clone)]
    struct DownStore;

    #[async_trait]
    impl ContentStore for DownStore {
        async fn put(&self, _payload: Vec<u8>) -> Result<ContentId, PublishError> {
            Err(PublishError::Unavailable("connection refused".into()))
        }
    }

    #[derive(Debug, Clone)]
    struct StalledStore;

    #[async_trait]
    impl ContentStore for StalledStore {
        async fn put(&self, _payload: Vec<u8>) -> Result<ContentId, PublishError> {
            std::future::pending().await
        }
    }

    /// Ledger whose appends never finish; everything else goes to memory
    #[derive(Debug, Clone, Default)]
    struct StalledLedger {
        inner: MemoryLedger,
        append_started: Arc<Notify>,
    }

    #[async_trait]
    impl IdentityLedger for StalledLedger {
        type Error = MemoryLedgerError;

        async fn bind_public_key(
            &self,
            handle: &IdentityHandle,
            public_key: &PublicKey,
        ) -> Result<(), LedgerError<Self::Error>> {
            self.inner.bind_public_key(handle, public_key).await
        }

        async fn register_identity(
            &self,
            handle: &IdentityHandle,
            public_key: &PublicKey,
        ) -> Result<(), LedgerError<Self::Error>> {
            self.inner.register_identity(handle, public_key).await
        }

        async fn rotate_public_key(
            &self,
            handle: &IdentityHandle,
            public_key: &PublicKey,
        ) -> Result<(), LedgerError<Self::Error>> {
            self.inner.rotate_public_key(handle, public_key).await
        }

        async fn append_reference(
            &self,
            _handle: &IdentityHandle,
            _reference: &Reference,
        ) -> Result<AppendOutcome, LedgerError<Self::Error>> {
            self.append_started.notify_one();
            std::future::pending().await
        }

        async fn read_log(
            &self,
            handle: &IdentityHandle,
        ) -> Result<Vec<Reference>, LedgerError<Self::Error>> {
            self.inner.read_log(handle).await
        }

        async fn exists(&self, handle: &IdentityHandle) -> Result<bool, LedgerError<Self::Error>> {
            self.inner.exists(handle).await
        }

        async fn public_key(
            &self,
            handle: &IdentityHandle,
        ) -> Result<PublicKey, LedgerError<Self::Error>> {
            self.inner.public_key(handle).await
        }

        async fn list_identities(&self) -> Result<Vec<IdentityHandle>, LedgerError<Self::Error>> {
            self.inner.list_identities().await
        }
    }

    async fn stalled_ledger_pipeline() -> (
        DocumentPipeline<MemoryContentStore, StalledLedger>,
        IdentityHandle,
        Arc<Notify>,
    ) {
        let ledger = StalledLedger::default();
        let handle: IdentityHandle = "alice@example.com".parse().unwrap();
        ledger
            .register_identity(&handle, &SecretKey::generate().unwrap().public())
            .await
            .unwrap();
        let started = ledger.append_started.clone();
        let pipeline =
            DocumentPipeline::new(ContentPublisher::new(MemoryContentStore::new()), ledger);
        (pipeline, handle, started)
    }

    async fn registered<S: ContentStore>(
        store: S,
    ) -> (DocumentPipeline<S, MemoryLedger>, IdentityHandle) {
        let ledger = MemoryLedger::new();
        let handle: IdentityHandle = "alice@example.com".parse().unwrap();
        ledger
            .bind_public_key(&handle, &SecretKey::generate().unwrap().public())
            .await
            .unwrap();
        (
            DocumentPipeline::new(ContentPublisher::new(store), ledger),
            handle,
        )
    }

    #[tokio::test]
    async fn test_record_document() {
        let (pipeline, alice) = registered(MemoryContentStore::new()).await;
        let key = ContentKey::generate().unwrap();

        let recorded = pipeline
            .record_document(&alice, b"hello-world", &key)
            .await
            .unwrap();

        assert_eq!(
            recorded.hash.as_str(),
            "afa27b44d43b02a9fea41d13cedc2e4016cfcf87c5dbf990e593669aa8ce286d"
        );
        assert_eq!(recorded.position, 0);
        assert!(!recorded.already_recorded);
        assert_eq!(
            pipeline.ledger().read_log(&alice).await.unwrap(),
            vec![Reference::from(&recorded.cid)]
        );
        assert!(pipeline.publisher().store().contains(&recorded.cid).unwrap());
    }

    #[tokio::test]
    async fn test_same_envelope_recorded_once() {
        let (pipeline, alice) = registered(MemoryContentStore::new()).await;
        let envelope = document::process(b"doc", &ContentKey::generate().unwrap()).unwrap();

        let first = pipeline.record_envelope(&alice, &envelope).await.unwrap();
        let second = pipeline.record_envelope(&alice, &envelope).await.unwrap();

        assert_eq!(first.cid, second.cid);
        assert!(second.already_recorded);
        assert_eq!(second.position, 0);
        assert_eq!(pipeline.ledger().read_log(&alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_identity_publishes_nothing() {
        let (pipeline, _) = registered(MemoryContentStore::new()).await;
        let ghost: IdentityHandle = "ghost@example.com".parse().unwrap();

        let err = pipeline
            .record_document(&ghost, b"doc", &ContentKey::generate().unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Ledger(LedgerError::UnknownIdentity(_))
        ));
        assert!(pipeline.publisher().store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_publish_failure_blocks_append() {
        let (pipeline, alice) = registered(DownStore).await;

        let err = pipeline
            .record_document(&alice, b"doc", &ContentKey::generate().unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Publish(ref e) if e.is_retryable()));
        assert!(pipeline.ledger().read_log(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_leaves_ledger_untouched() {
        let (pipeline, alice) = registered(StalledStore).await;
        let (tx, rx) = watch::channel(());
        let key = ContentKey::generate().unwrap();

        let task = {
            let pipeline = pipeline.clone();
            let alice = alice.clone();
            tokio::spawn(async move {
                pipeline
                    .record_document_until(&alice, b"doc", &key, rx)
                    .await
            })
        };
        tokio::task::yield_now().await;
        tx.send(()).unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, PipelineError::Publish(PublishError::Cancelled)));
        assert!(pipeline.ledger().read_log(&alice).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_append_times_out() {
        let (pipeline, alice, _) = stalled_ledger_pipeline().await;
        let pipeline = pipeline.with_ledger_timeout(std::time::Duration::from_secs(5));
        let envelope = document::process(b"doc", &ContentKey::generate().unwrap()).unwrap();

        let err = pipeline.record_envelope(&alice, &envelope).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Ledger(LedgerError::TimedOut(t)) if t.as_secs() == 5
        ));

        let err = pipeline
            .record_reference(&alice, &"0x01".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Ledger(LedgerError::TimedOut(_))));
    }

    #[tokio::test]
    async fn test_cancel_during_stalled_append() {
        let (pipeline, alice, append_started) = stalled_ledger_pipeline().await;
        let envelope = document::process(b"doc", &ContentKey::generate().unwrap()).unwrap();
        let (tx, rx) = watch::channel(());

        let task = {
            let pipeline = pipeline.clone();
            let envelope = envelope.clone();
            tokio::spawn(async move {
                pipeline
                    .record_envelope_until(&alice, &envelope, rx)
                    .await
            })
        };
        // content is published by the time the append is reached
        append_started.notified().await;
        tx.send(()).unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, PipelineError::Ledger(LedgerError::Cancelled)));
        assert_eq!(pipeline.publisher().store().len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_reference() {
        let (pipeline, alice) = registered(MemoryContentStore::new()).await;
        let tx_hash: Reference = "0x5f1e0c".parse().unwrap();

        let outcome = pipeline.record_reference(&alice, &tx_hash).await.unwrap();
        assert_eq!(outcome, AppendOutcome::Appended { position: 0 });

        let again = pipeline.record_reference(&alice, &tx_hash).await.unwrap();
        assert_eq!(again, AppendOutcome::AlreadyRecorded { position: 0 });
    }
}
