use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::config::StreamConfig;
use crate::crypto::container::TAG_LEN;
use crate::crypto::gcm::GcmStream;
use crate::crypto::types::{EncryptionKey, Nonce};
use crate::errors::{CryptoError, Result};

/// Encrypt `source` into `sink` under a fresh key, one chunk at a time.
///
/// Returns the number of envelope bytes written and the key text.
pub async fn encrypt_stream<R, W>(
    source: &mut R,
    sink: &mut W,
    config: &StreamConfig,
) -> Result<(u64, String)>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let key = EncryptionKey::generate()?;
    let written = encrypt_stream_with_key(source, sink, &key, config).await?;
    Ok((written, key.encode()))
}

pub async fn encrypt_stream_with_key<R, W>(
    source: &mut R,
    sink: &mut W,
    key: &EncryptionKey,
    config: &StreamConfig,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let nonce = Nonce::generate()?;
    let mut gcm = GcmStream::new(key, &nonce);

    // Header goes out before any ciphertext
    let header = config.layout.header(&nonce);
    sink.write_all(&header).await?;
    let mut written = header.len() as u64;

    let mut buffer = vec![0u8; config.chunk_size()];
    loop {
        let n = source.read(&mut buffer).await?;
        if n == 0 {
            break;
        }

        let chunk = &mut buffer[..n];
        gcm.seal_chunk(chunk)?;
        sink.write_all(chunk).await?;
        written += n as u64;
    }

    // Tag is always the last 16 bytes
    let tag = gcm.finalize();
    sink.write_all(&tag).await?;
    sink.flush().await?;
    written += TAG_LEN as u64;

    debug!(
        layout = ?config.layout,
        chunk_size = config.chunk_size(),
        bytes_written = written,
        "Streamed envelope sealed"
    );

    Ok(written)
}

/// Decrypt an envelope from `source`, writing plaintext to `sink`.
///
/// Plaintext reaches the sink before the tag is checked. On error the sink
/// holds unverified data and must be discarded by the caller.
pub async fn decrypt_stream<R, W>(
    source: &mut R,
    sink: &mut W,
    key_text: &str,
    config: &StreamConfig,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let nonce = read_header(source, config).await?;
    let key = EncryptionKey::decode(key_text)?;
    decrypt_body(source, sink, &key, &nonce, config).await
}

pub async fn decrypt_stream_with_key<R, W>(
    source: &mut R,
    sink: &mut W,
    key: &EncryptionKey,
    config: &StreamConfig,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let nonce = read_header(source, config).await?;
    decrypt_body(source, sink, key, &nonce, config).await
}

async fn read_header<R>(source: &mut R, config: &StreamConfig) -> Result<Nonce>
where
    R: AsyncRead + Unpin,
{
    let mut header = vec![0u8; config.layout.header_len()];
    let mut filled = 0;
    while filled < header.len() {
        let n = source.read(&mut header[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    config.layout.parse_header(&header[..filled])
}

async fn decrypt_body<R, W>(
    source: &mut R,
    sink: &mut W,
    key: &EncryptionKey,
    nonce: &Nonce,
    config: &StreamConfig,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut gcm = GcmStream::new(key, nonce);

    // Front of the buffer holds back the newest TAG_LEN bytes, the rest
    // of it is released as ciphertext once more data shows up behind it
    let mut buffer = vec![0u8; config.chunk_size() + TAG_LEN];
    let mut held = 0;
    let mut plaintext_len = 0u64;

    loop {
        let n = source.read(&mut buffer[held..]).await?;
        if n == 0 {
            break;
        }

        let filled = held + n;
        if filled <= TAG_LEN {
            held = filled;
            continue;
        }

        let body_len = filled - TAG_LEN;
        let body = &mut buffer[..body_len];
        gcm.open_chunk(body)?;
        sink.write_all(body).await?;
        plaintext_len += body_len as u64;

        buffer.copy_within(body_len..filled, 0);
        held = TAG_LEN;
    }

    let header_len = config.layout.header_len();
    if held < TAG_LEN {
        return Err(CryptoError::truncated(
            header_len + TAG_LEN,
            header_len + held,
        ));
    }

    if let Err(e) = gcm.verify(&buffer[..TAG_LEN]) {
        warn!(
            ciphertext_len = plaintext_len,
            "Streamed envelope failed authentication"
        );
        return Err(e);
    }
    sink.flush().await?;

    debug!(
        layout = ?config.layout,
        plaintext_len,
        "Streamed envelope opened"
    );

    Ok(plaintext_len)
}
