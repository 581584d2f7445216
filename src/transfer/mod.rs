pub mod storage;

pub use storage::{
    decrypt_file, default_decrypt_path, encrypt_file, encrypt_reader_to_file, SealedFile,
};
