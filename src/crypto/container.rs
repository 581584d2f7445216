//! Envelope layout
//!
//! Marked (canonical):  MAGIC[4] || nonce[12] || ciphertext || tag[16]
//! Bare (legacy web):   nonce[12] || ciphertext || tag[16]
//!
//! Both carry one AES-256-GCM message with no associated data, so the
//! ciphertext || tag tail is identical whichever path produced it.

use crate::crypto::types::Nonce;
use crate::errors::{CryptoError, Result};

/// Format marker, also the format version tag.
pub const MAGIC: &[u8; 4] = b"SFT1";

pub const MAGIC_LEN: usize = 4;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

/// Smallest marked envelope that gets past header checks.
pub const HEADER_LEN: usize = MAGIC_LEN + NONCE_LEN; // 16

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// MAGIC-prefixed envelope, the default everywhere.
    #[default]
    Marked,
    /// Nonce-first envelope without a marker, kept for the old upload flow.
    Bare,
}

impl Layout {
    pub fn header_len(self) -> usize {
        match self {
            Layout::Marked => HEADER_LEN,
            Layout::Bare => NONCE_LEN,
        }
    }

    /// Serialized header for this layout.
    pub fn header(self, nonce: &Nonce) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header_len());
        if self == Layout::Marked {
            out.extend_from_slice(MAGIC);
        }
        out.extend_from_slice(nonce.as_bytes());
        out
    }

    /// Validate a complete header and pull the nonce out of it.
    ///
    /// Length is checked first, then the marker. Nothing cryptographic
    /// happens here.
    pub fn parse_header(self, header: &[u8]) -> Result<Nonce> {
        let need = self.header_len();
        if header.len() < need {
            return Err(CryptoError::truncated(need, header.len()));
        }

        let nonce_start = match self {
            Layout::Marked => {
                if &header[..MAGIC_LEN] != MAGIC {
                    return Err(CryptoError::FormatMismatch);
                }
                MAGIC_LEN
            }
            Layout::Bare => 0,
        };

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&header[nonce_start..nonce_start + NONCE_LEN]);
        Ok(Nonce::from_bytes(nonce))
    }
}

/// Borrowed view of a parsed single-shot envelope.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeParts<'a> {
    pub nonce: Nonce,
    /// ciphertext || tag
    pub sealed: &'a [u8],
}

pub fn decode_envelope(data: &[u8]) -> Result<EnvelopeParts<'_>> {
    let nonce = Layout::Marked.parse_header(data)?;
    Ok(EnvelopeParts {
        nonce,
        sealed: &data[HEADER_LEN..],
    })
}

pub fn encode_envelope(nonce: &Nonce, sealed: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + sealed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(nonce.as_bytes());
    out.extend_from_slice(sealed);
    out
}
