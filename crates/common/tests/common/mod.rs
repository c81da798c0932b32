//! Shared test utilities for pipeline integration tests
#![allow(dead_code)]

use common::content::{ContentPublisher, ContentStore, MemoryContentStore};
use common::crypto::{generate_identity_keys, IdentityKeyPair};
use common::ledger::{IdentityHandle, IdentityLedger, MemoryLedger};
use common::pipeline::DocumentPipeline;

/// Set up a pipeline over `store` with one registered identity
pub async fn setup_pipeline<S: ContentStore>(
    store: S,
) -> (
    DocumentPipeline<S, MemoryLedger>,
    IdentityHandle,
    IdentityKeyPair,
) {
    let ledger = MemoryLedger::new();
    let handle: IdentityHandle = "alice@example.com".parse().unwrap();
    let keys = generate_identity_keys().unwrap();
    ledger.bind_public_key(&handle, &keys.public()).await.unwrap();

    let pipeline = DocumentPipeline::new(ContentPublisher::new(store), ledger);
    (pipeline, handle, keys)
}

/// Pipeline over an unbounded in-memory store
pub async fn setup_memory_pipeline() -> (
    DocumentPipeline<MemoryContentStore, MemoryLedger>,
    IdentityHandle,
    IdentityKeyPair,
) {
    setup_pipeline(MemoryContentStore::new()).await
}
