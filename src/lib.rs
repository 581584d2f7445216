pub mod crypto;
pub mod errors;
pub mod transfer;

pub use errors::{CryptoError, Result};

pub mod config {
    pub use crate::crypto::container::{
        Layout, HEADER_LEN, KEY_LEN, MAGIC, MAGIC_LEN, NONCE_LEN, TAG_LEN,
    };

    pub const STREAM_CHUNK_SIZE: usize = 4 * 1024 * 1024; // 4MB

    /// Knobs for the streaming and file paths.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StreamConfig {
        chunk_size: usize,
        pub layout: Layout,
    }

    impl StreamConfig {
        pub fn new() -> Self {
            Self {
                chunk_size: STREAM_CHUNK_SIZE,
                layout: Layout::Marked,
            }
        }

        pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
            // zero would never make progress
            self.chunk_size = chunk_size.max(1);
            self
        }

        pub fn with_layout(mut self, layout: Layout) -> Self {
            self.layout = layout;
            self
        }

        pub fn chunk_size(&self) -> usize {
            self.chunk_size
        }
    }

    impl Default for StreamConfig {
        fn default() -> Self {
            Self::new()
        }
    }
}
