//! Document sealing
//!
//! A document is fingerprinted with SHA-256 and then encrypted with
//! AES-256-GCM under a caller supplied [`ContentKey`](crate::crypto::ContentKey).
//! The result is an [`EncryptedEnvelope`]: nonce, tag and ciphertext, plus the
//! plaintext digest reported alongside it.
//!
//! Nothing in this module touches the network or the ledger.

mod digest;
mod envelope;
mod processor;

pub use digest::{digest, ContentDigest, DigestError, DIGEST_HEX_LEN};
pub use envelope::{EncryptedEnvelope, EnvelopeError, EnvelopeWire, NONCE_SIZE, TAG_SIZE};
pub use processor::{open, process, process_encoded, ProcessError};
