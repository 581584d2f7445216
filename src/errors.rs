use thiserror::Error;

/// Every failure the codec can report.
///
/// Messages never carry key material or plaintext.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Malformed key: expected URL-safe base64 of exactly 32 bytes")]
    MalformedKey,

    #[error("Container format marker mismatch")]
    FormatMismatch,

    #[error("Container truncated: need at least {expected} bytes, got {got}")]
    TruncatedContainer { expected: usize, got: usize },

    #[error("Authentication failed: container was tampered with or corrupted")]
    AuthenticationFailed,

    #[error("System entropy source unavailable")]
    EntropyUnavailable,

    #[error("Input exceeds the maximum size for a single nonce")]
    InputTooLarge,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CryptoError {
    pub(crate) fn truncated(expected: usize, got: usize) -> Self {
        Self::TruncatedContainer { expected, got }
    }
}

pub type Result<T> = std::result::Result<T, CryptoError>;
