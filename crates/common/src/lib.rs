/**
 * Key generation.
 *  - Ed25519 identity keypairs
 *  - AES-256-GCM content keys
 */
pub mod crypto;
/**
 * Publishing sealed documents to
 *  content-addressed stores.
 */
pub mod content;
/**
 * Digesting and sealing documents
 *  into encrypted envelopes.
 */
pub mod document;
/**
 * Identity handles bound to a public key
 *  and an append-only reference log.
 */
pub mod ledger;
/**
 * Seal, publish, append.
 */
pub mod pipeline;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::content::{
        ContentId, ContentPublisher, ContentStore, MemoryContentStore, PinningAuth,
        PinningClient, PublishError,
    };
    pub use crate::crypto::{ContentKey, IdentityKeyPair, PublicKey, SecretKey};
    pub use crate::document::{ContentDigest, EncryptedEnvelope, EnvelopeWire, ProcessError};
    pub use crate::ledger::{
        AppendOutcome, IdentityHandle, IdentityLedger, IdentityRecord, LedgerError, MemoryLedger,
        Reference,
    };
    pub use crate::pipeline::{DocumentPipeline, PipelineError, RecordedDocument};
    pub use crate::version::build_info;
}
