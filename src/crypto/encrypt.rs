use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit};
use tracing::debug;

use crate::crypto::container::encode_envelope;
use crate::crypto::types::{EncryptionKey, Nonce};
use crate::errors::{CryptoError, Result};

/// Output of a single-shot encryption.
#[derive(Debug)]
pub struct Sealed {
    pub envelope: Vec<u8>,
    /// Key text for the recipient, shared out of band.
    pub key: String,
}

/// Encrypt a whole buffer into a marked envelope under a fresh key.
pub fn encrypt(plaintext: &[u8]) -> Result<Sealed> {
    let key = EncryptionKey::generate()?;
    let envelope = encrypt_with_key(&key, plaintext)?;

    Ok(Sealed {
        envelope,
        key: key.encode(),
    })
}

/// Encrypt under a caller-held key. A new nonce is drawn on every call.
pub fn encrypt_with_key(key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let nonce = Nonce::generate()?;
    let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));

    // ciphertext with the 16 byte tag appended, no AAD
    let sealed = cipher
        .encrypt(GenericArray::from_slice(nonce.as_bytes()), plaintext)
        .map_err(|_| CryptoError::InputTooLarge)?;

    debug!(
        plaintext_len = plaintext.len(),
        sealed_len = sealed.len(),
        "Sealed single-shot envelope"
    );

    Ok(encode_envelope(&nonce, &sealed))
}
