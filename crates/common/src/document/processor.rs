use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use zeroize::Zeroizing;

use super::digest::digest;
use super::envelope::{EncryptedEnvelope, NONCE_SIZE, TAG_SIZE};
use crate::crypto::{fill_random, ContentKey, EntropyUnavailable, CONTENT_KEY_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("content key must be {CONTENT_KEY_SIZE} bytes of base64, got {0}")]
    InvalidKeyLength(String),
    #[error("encryption failed")]
    EncryptionFailure,
    #[error("decryption failed: ciphertext, tag or key is wrong")]
    DecryptionFailure,
    #[error("decrypted plaintext does not match the recorded digest")]
    DigestMismatch,
    #[error(transparent)]
    EntropyUnavailable(#[from] EntropyUnavailable),
}

/// Seal `plaintext` under `key`
///
/// Digests the plaintext first, then encrypts it with AES-256-GCM under a
/// fresh random nonce. Two calls on the same input never share a nonce.
pub fn process(plaintext: &[u8], key: &ContentKey) -> Result<EncryptedEnvelope, ProcessError> {
    let plaintext_digest = digest(plaintext);

    let mut iv = [0u8; NONCE_SIZE];
    fill_random(&mut iv)?;

    let cipher =
        Aes256Gcm::new_from_slice(key.bytes()).map_err(|_| ProcessError::EncryptionFailure)?;
    // holds plaintext until encryption succeeds
    let mut buffer = Zeroizing::new(plaintext.to_vec());
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut *buffer)
        .map_err(|_| ProcessError::EncryptionFailure)?;
    let ciphertext = std::mem::take(&mut *buffer);

    let mut auth_tag = [0u8; TAG_SIZE];
    auth_tag.copy_from_slice(tag.as_slice());

    tracing::debug!(
        digest = %plaintext_digest,
        size = plaintext.len(),
        "sealed document"
    );
    Ok(EncryptedEnvelope::new(iv, auth_tag, ciphertext, plaintext_digest))
}

/// Seal `plaintext` under a key given in its base64 transport form
pub fn process_encoded(plaintext: &[u8], key: &str) -> Result<EncryptedEnvelope, ProcessError> {
    let key = ContentKey::from_base64(key)
        .map_err(|err| ProcessError::InvalidKeyLength(err.to_string()))?;
    process(plaintext, &key)
}

/// Decrypt an envelope and check it against its recorded digest
///
/// Fails closed: a wrong key, a modified ciphertext or a modified tag all
/// produce [`ProcessError::DecryptionFailure`] and no plaintext.
pub fn open(envelope: &EncryptedEnvelope, key: &ContentKey) -> Result<Vec<u8>, ProcessError> {
    let cipher =
        Aes256Gcm::new_from_slice(key.bytes()).map_err(|_| ProcessError::DecryptionFailure)?;
    let mut buffer = Zeroizing::new(envelope.ciphertext().to_vec());
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(envelope.iv()),
            b"",
            &mut *buffer,
            Tag::from_slice(envelope.auth_tag()),
        )
        .map_err(|_| ProcessError::DecryptionFailure)?;

    if !envelope.plaintext_digest().matches(&buffer) {
        return Err(ProcessError::DigestMismatch);
    }
    Ok(std::mem::take(&mut *buffer))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::ContentDigest;

    #[test]
    fn test_hello_world() {
        let key = ContentKey::generate().unwrap();
        let envelope = process(b"hello-world", &key).unwrap();

        assert_eq!(
            envelope.plaintext_digest().as_str(),
            "afa27b44d43b02a9fea41d13cedc2e4016cfcf87c5dbf990e593669aa8ce286d"
        );
        assert_eq!(envelope.ciphertext().len(), b"hello-world".len());
        assert_eq!(envelope.iv().len(), 12);
        assert_eq!(envelope.auth_tag().len(), 16);

        assert_eq!(open(&envelope, &key).unwrap(), b"hello-world");
    }

    #[test]
    fn test_plaintext_never_left_in_envelope() {
        let key = ContentKey::generate().unwrap();
        let plaintext = vec![0x42u8; 4096];
        let envelope = process(&plaintext, &key).unwrap();

        assert_eq!(envelope.ciphertext().len(), plaintext.len());
        assert_ne!(envelope.ciphertext(), &plaintext[..]);
        assert_eq!(open(&envelope, &key).unwrap(), plaintext);
    }

    #[test]
    fn test_empty_plaintext() {
        let key = ContentKey::generate().unwrap();
        let envelope = process(b"", &key).unwrap();

        assert!(envelope.ciphertext().is_empty());
        assert_eq!(
            envelope.plaintext_digest().as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(open(&envelope, &key).unwrap().is_empty());
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let key = ContentKey::generate().unwrap();
        let a = process(b"same document", &key).unwrap();
        let b = process(b"same document", &key).unwrap();

        assert_ne!(a.iv(), b.iv());
        assert_ne!(a.ciphertext(), b.ciphertext());
        assert_eq!(a.plaintext_digest(), b.plaintext_digest());
    }

    #[test]
    fn test_digest_independent_of_key() {
        let a = process(b"keyless fingerprint", &ContentKey::generate().unwrap()).unwrap();
        let b = process(b"keyless fingerprint", &ContentKey::generate().unwrap()).unwrap();
        assert_eq!(a.plaintext_digest(), b.plaintext_digest());
    }

    #[test]
    fn test_wrong_key_fails_closed() {
        let key = ContentKey::generate().unwrap();
        let other = ContentKey::generate().unwrap();
        let envelope = process(b"secret document", &key).unwrap();

        assert!(matches!(
            open(&envelope, &other),
            Err(ProcessError::DecryptionFailure)
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = ContentKey::generate().unwrap();
        let envelope = process(b"secret document", &key).unwrap();

        let mut ciphertext = envelope.ciphertext().to_vec();
        ciphertext[0] ^= 0x01;
        let tampered = EncryptedEnvelope::new(
            *envelope.iv(),
            *envelope.auth_tag(),
            ciphertext,
            envelope.plaintext_digest().clone(),
        );

        assert!(matches!(
            open(&tampered, &key),
            Err(ProcessError::DecryptionFailure)
        ));
    }

    #[test]
    fn test_tampered_tag_fails() {
        let key = ContentKey::generate().unwrap();
        let envelope = process(b"secret document", &key).unwrap();

        let mut tag = *envelope.auth_tag();
        tag[15] ^= 0x80;
        let tampered = EncryptedEnvelope::new(
            *envelope.iv(),
            tag,
            envelope.ciphertext().to_vec(),
            envelope.plaintext_digest().clone(),
        );

        assert!(matches!(
            open(&tampered, &key),
            Err(ProcessError::DecryptionFailure)
        ));
    }

    #[test]
    fn test_digest_mismatch() {
        let key = ContentKey::generate().unwrap();
        let envelope = process(b"secret document", &key).unwrap();
        let relabelled = EncryptedEnvelope::new(
            *envelope.iv(),
            *envelope.auth_tag(),
            envelope.ciphertext().to_vec(),
            ContentDigest::of(b"some other document"),
        );

        assert!(matches!(
            open(&relabelled, &key),
            Err(ProcessError::DigestMismatch)
        ));
    }

    #[test]
    fn test_process_encoded() {
        let key = ContentKey::generate().unwrap();
        let envelope = process_encoded(b"hello-world", &key.to_base64()).unwrap();
        assert_eq!(open(&envelope, &key).unwrap(), b"hello-world");
    }

    #[test]
    fn test_process_encoded_rejects_bad_keys() {
        // 16 bytes, valid base64
        let short = "AAAAAAAAAAAAAAAAAAAAAA==";
        assert!(matches!(
            process_encoded(b"data", short),
            Err(ProcessError::InvalidKeyLength(_))
        ));
        assert!(matches!(
            process_encoded(b"data", "not a key"),
            Err(ProcessError::InvalidKeyLength(_))
        ));
        assert!(matches!(
            process_encoded(b"data", ""),
            Err(ProcessError::InvalidKeyLength(_))
        ));
    }
}
