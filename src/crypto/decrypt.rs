use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit};
use tracing::{debug, warn};

use crate::crypto::container::{decode_envelope, NONCE_LEN};
use crate::crypto::types::EncryptionKey;
use crate::errors::{CryptoError, Result};

/// Decrypt a marked envelope with the key text handed out at encrypt time.
///
/// Checks run in order: length, marker, key, then the AEAD. Either the
/// whole verified plaintext comes back or nothing does.
pub fn decrypt(envelope: &[u8], key_text: &str) -> Result<Vec<u8>> {
    let parts = decode_envelope(envelope)?;
    let key = EncryptionKey::decode(key_text)?;
    open(&key, parts.nonce.as_bytes(), parts.sealed)
}

pub fn decrypt_with_key(envelope: &[u8], key: &EncryptionKey) -> Result<Vec<u8>> {
    let parts = decode_envelope(envelope)?;
    open(key, parts.nonce.as_bytes(), parts.sealed)
}

fn open(key: &EncryptionKey, nonce: &[u8; NONCE_LEN], sealed: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));

    let plaintext = cipher
        .decrypt(GenericArray::from_slice(nonce), sealed)
        .map_err(|_| {
            warn!(sealed_len = sealed.len(), "Envelope failed authentication");
            CryptoError::AuthenticationFailed
        })?;

    debug!(plaintext_len = plaintext.len(), "Opened single-shot envelope");
    Ok(plaintext)
}
