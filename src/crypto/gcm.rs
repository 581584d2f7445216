//! Incremental AES-256-GCM
//!
//! `aes-gcm` only seals whole buffers. This drives the same primitives
//! (AES block cipher, 32-bit big endian CTR, GHASH) one chunk at a time so
//! a stream of any length comes out byte-identical to a single-shot seal
//! with the same key and nonce, and no associated data.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};
use aes::Aes256;
use ghash::universal_hash::{KeyInit as HashKeyInit, UniversalHash};
use ghash::{Block, GHash};
use subtle::ConstantTimeEq;

use crate::crypto::container::{NONCE_LEN, TAG_LEN};
use crate::crypto::types::{EncryptionKey, Nonce};
use crate::errors::{CryptoError, Result};

type Aes256Ctr = ctr::Ctr32BE<Aes256>;

const BLOCK_LEN: usize = 16;

/// GCM plaintext ceiling for one nonce: 2^32 - 2 blocks.
pub const MAX_MESSAGE_LEN: u64 = ((1u64 << 32) - 2) * BLOCK_LEN as u64;

pub struct GcmStream {
    keystream: Aes256Ctr,
    ghash: GHash,
    // E(K, J0), XORed into the final GHASH output
    tag_mask: Block,
    // partial GHASH block carried between chunks
    pending: [u8; BLOCK_LEN],
    pending_len: usize,
    processed: u64,
}

impl GcmStream {
    pub fn new(key: &EncryptionKey, nonce: &Nonce) -> Self {
        let cipher = Aes256::new(GenericArray::from_slice(key.as_bytes()));

        // H = E(K, 0^128)
        let mut h = Block::default();
        cipher.encrypt_block(&mut h);

        // J0 = nonce || 0x00000001
        let mut tag_mask = Block::default();
        tag_mask[..NONCE_LEN].copy_from_slice(nonce.as_bytes());
        tag_mask[BLOCK_LEN - 1] = 1;
        cipher.encrypt_block(&mut tag_mask);

        // payload keystream starts at inc32(J0)
        let mut iv = [0u8; BLOCK_LEN];
        iv[..NONCE_LEN].copy_from_slice(nonce.as_bytes());
        iv[BLOCK_LEN - 1] = 2;
        let keystream = Aes256Ctr::new(
            GenericArray::from_slice(key.as_bytes()),
            GenericArray::from_slice(&iv),
        );

        Self {
            keystream,
            ghash: <GHash as HashKeyInit>::new(&h),
            tag_mask,
            pending: [0u8; BLOCK_LEN],
            pending_len: 0,
            processed: 0,
        }
    }

    /// Bytes of ciphertext processed so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Encrypt `buf` in place and fold the ciphertext into the tag.
    pub fn seal_chunk(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reserve(buf.len())?;
        self.keystream
            .try_apply_keystream(buf)
            .map_err(|_| CryptoError::InputTooLarge)?;
        self.absorb(buf);
        Ok(())
    }

    /// Fold ciphertext into the tag, then decrypt `buf` in place.
    pub fn open_chunk(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reserve(buf.len())?;
        self.absorb(buf);
        self.keystream
            .try_apply_keystream(buf)
            .map_err(|_| CryptoError::InputTooLarge)?;
        Ok(())
    }

    pub fn finalize(mut self) -> [u8; TAG_LEN] {
        if self.pending_len > 0 {
            self.ghash.update_padded(&self.pending[..self.pending_len]);
        }

        // len(A) = 0 || len(C), both in bits
        let mut lengths = Block::default();
        lengths[8..].copy_from_slice(&(self.processed * 8).to_be_bytes());
        self.ghash.update(&[lengths]);

        let mut tag = [0u8; TAG_LEN];
        for ((out, s), m) in tag
            .iter_mut()
            .zip(self.ghash.finalize().iter())
            .zip(self.tag_mask.iter())
        {
            *out = s ^ m;
        }
        tag
    }

    /// Finish and compare against the received tag in constant time.
    pub fn verify(self, received: &[u8]) -> Result<()> {
        let expected = self.finalize();
        if bool::from(expected.as_slice().ct_eq(received)) {
            Ok(())
        } else {
            Err(CryptoError::AuthenticationFailed)
        }
    }

    fn reserve(&mut self, len: usize) -> Result<()> {
        let total = self
            .processed
            .checked_add(len as u64)
            .filter(|total| *total <= MAX_MESSAGE_LEN)
            .ok_or(CryptoError::InputTooLarge)?;
        self.processed = total;
        Ok(())
    }

    fn absorb(&mut self, mut data: &[u8]) {
        // top up a partial block left by the previous chunk
        if self.pending_len > 0 {
            let take = (BLOCK_LEN - self.pending_len).min(data.len());
            self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&data[..take]);
            self.pending_len += take;
            data = &data[take..];

            if self.pending_len < BLOCK_LEN {
                return;
            }
            self.ghash.update(&[Block::clone_from_slice(&self.pending)]);
            self.pending_len = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_LEN);
        for block in &mut blocks {
            self.ghash.update(&[Block::clone_from_slice(block)]);
        }

        let rest = blocks.remainder();
        self.pending[..rest.len()].copy_from_slice(rest);
        self.pending_len = rest.len();
    }
}
