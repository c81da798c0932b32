//! Cryptographic primitives for docseal
//!
//! This module provides the key material the rest of the pipeline consumes:
//!
//! - **Identity**: Ed25519 keypairs. The public half is bound to an identity
//!   in the ledger; the secret half stays with the user and only leaves the
//!   process through an explicit export.
//! - **Content keys**: 256-bit AES-256-GCM keys used by the document
//!   processor. A content key is never persisted by the core; the ledger only
//!   stores what was produced with it.
//!
//! # Entropy
//!
//! All randomness is read from the operating system CSPRNG through
//! `getrandom`. If the source cannot be read, generation fails with
//! [`EntropyUnavailable`]; there is no fallback to a weaker generator.
//!
//! # Encoding
//!
//! Every key crosses process boundaries as standard base64 text. Callers
//! decode before cryptographic use.

mod content_key;
mod keygen;
mod keys;

pub use content_key::{ContentKey, ContentKeyError, CONTENT_KEY_SIZE};
pub use ed25519_dalek::Signature;
pub use keygen::{generate_all_keys, generate_content_key, generate_identity_keys, GeneratedKeys};
pub use keys::{
    ExportedKeyPair, IdentityKeyPair, KeyError, PublicKey, SecretKey, KEYPAIR_EXPORT_SIZE,
    PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE,
};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// The operating system random source could not be read.
///
/// Fatal for the calling operation. Never retried and never papered over
/// with a weaker generator.
#[derive(Debug, thiserror::Error)]
#[error("secure random source unavailable: {0}")]
pub struct EntropyUnavailable(#[from] getrandom::Error);

/// Fill `buf` from the OS CSPRNG.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<(), EntropyUnavailable> {
    getrandom::getrandom(buf)?;
    Ok(())
}

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub(crate) fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text.trim())
}
