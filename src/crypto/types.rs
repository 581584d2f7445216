use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::container::{KEY_LEN, NONCE_LEN};
use crate::errors::{CryptoError, Result};

// Emits unpadded url-safe text, accepts keys with or without trailing '='
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

fn fill_random(buf: &mut [u8]) -> Result<()> {
    // entropy failure is fatal, no retry
    OsRng
        .try_fill_bytes(buf)
        .map_err(|_| CryptoError::EntropyUnavailable)
}

//---------------------------------------
// AES-256-GCM encryption key (32 bytes)
//---------------------------------------
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Draw a fresh key from the OS random source.
    pub fn generate() -> Result<Self> {
        let mut key = [0u8; KEY_LEN];
        fill_random(&mut key)?;
        Ok(Self(key))
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Transport form handed out of band: url-safe base64, no padding.
    pub fn encode(&self) -> String {
        KEY_ENGINE.encode(&self.0)
    }

    /// Inverse of [`encode`](Self::encode). Padded input is accepted too.
    pub fn decode(text: &str) -> Result<Self> {
        let mut bytes = KEY_ENGINE
            .decode(text)
            .map_err(|_| CryptoError::MalformedKey)?;
        if bytes.len() != KEY_LEN {
            bytes.zeroize();
            return Err(CryptoError::MalformedKey);
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self(key))
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

//-------------------------------------------
// 96-bit GCM nonce, fresh for every envelope
//-------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    pub fn generate() -> Result<Self> {
        let mut nonce = [0u8; NONCE_LEN];
        fill_random(&mut nonce)?;
        Ok(Self(nonce))
    }

    // Only for nonces read back out of an envelope
    pub(crate) fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}
