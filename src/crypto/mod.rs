pub mod container;
pub mod decrypt;
pub mod encrypt;
pub mod gcm;
pub mod stream;
pub mod types;

pub use container::{Layout, MAGIC};
pub use decrypt::{decrypt, decrypt_with_key};
pub use encrypt::{encrypt, encrypt_with_key, Sealed};
pub use stream::{decrypt_stream, decrypt_stream_with_key, encrypt_stream, encrypt_stream_with_key};
pub use types::{EncryptionKey, Nonce};

use crate::errors::Result;

//---------------------------------------
// Key manager entry points
//---------------------------------------

pub fn generate_key() -> Result<EncryptionKey> {
    EncryptionKey::generate()
}

pub fn encode_key(key: &EncryptionKey) -> String {
    key.encode()
}

pub fn decode_key(text: &str) -> Result<EncryptionKey> {
    EncryptionKey::decode(text)
}
