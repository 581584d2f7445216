// Storage module
// File level encrypt/decrypt on top of the streaming codec
// Output is staged in a temp file next to its destination and only renamed
// into place on success. Any early return drops the temp file, deleting it

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs::File;
use tokio::io::AsyncRead;
use tracing::{debug, warn};

use crate::config::StreamConfig;
use crate::crypto::stream::{decrypt_stream, encrypt_stream};
use crate::errors::Result;

const STAGING_PREFIX: &str = ".sealdrop-";
const ENCRYPTED_SUFFIX: &str = ".enc";

/// An envelope written to disk plus the key needed to open it.
#[derive(Debug)]
pub struct SealedFile {
    pub path: PathBuf,
    pub key: String,
    pub bytes_written: u64,
}

/// Encrypt the file at `input`.
///
/// Without `output` the envelope lands in a new `.enc` file in the system
/// temp dir, which the caller owns and must remove.
pub async fn encrypt_file(
    input: &Path,
    output: Option<&Path>,
    config: &StreamConfig,
) -> Result<SealedFile> {
    let mut source = File::open(input).await?;
    let staged = stage(output).await?;
    seal_into(&mut source, staged, output, config).await
}

/// Upload path: encrypt an arbitrary byte source straight to `output`.
pub async fn encrypt_reader_to_file<R>(
    source: &mut R,
    output: &Path,
    config: &StreamConfig,
) -> Result<SealedFile>
where
    R: AsyncRead + Unpin,
{
    let staged = stage(Some(output)).await?;
    seal_into(source, staged, Some(output), config).await
}

/// Decrypt the envelope at `input` and return where the plaintext went.
///
/// Defaults to [`default_decrypt_path`] when `output` is `None`. Nothing is
/// left at the destination if verification fails.
pub async fn decrypt_file(
    input: &Path,
    key_text: &str,
    output: Option<&Path>,
    config: &StreamConfig,
) -> Result<PathBuf> {
    let dest = match output {
        Some(path) => path.to_path_buf(),
        None => default_decrypt_path(input),
    };

    let mut source = File::open(input).await?;
    let staged = stage(Some(&dest)).await?;
    let mut sink = open_staged(&staged)?;

    let plaintext_len = match decrypt_stream(&mut source, &mut sink, key_text, config).await {
        Ok(n) => n,
        Err(e) => {
            warn!(
                staged = %staged.path().display(),
                "Discarding unverified plaintext"
            );
            return Err(e);
        }
    };
    sink.sync_all().await?;
    drop(sink);

    let path = commit(staged, Some(&dest))?;
    debug!(
        output = %path.display(),
        plaintext_len,
        "Decrypted file"
    );
    Ok(path)
}

/// Strip a trailing `.enc`, otherwise append `.decrypted`.
pub fn default_decrypt_path(input: &Path) -> PathBuf {
    // ".enc" alone is a dotfile with no extension, so it falls through
    if input.extension().is_some_and(|ext| ext == "enc") {
        return input.with_extension("");
    }

    let mut name = OsString::from(input.as_os_str());
    name.push(".decrypted");
    PathBuf::from(name)
}

async fn seal_into<R>(
    source: &mut R,
    staged: NamedTempFile,
    output: Option<&Path>,
    config: &StreamConfig,
) -> Result<SealedFile>
where
    R: AsyncRead + Unpin,
{
    let mut sink = open_staged(&staged)?;

    let (bytes_written, key) = match encrypt_stream(source, &mut sink, config).await {
        Ok(sealed) => sealed,
        Err(e) => {
            warn!(
                staged = %staged.path().display(),
                "Discarding partial envelope"
            );
            return Err(e);
        }
    };
    sink.sync_all().await?;
    drop(sink);

    let path = commit(staged, output)?;
    debug!(output = %path.display(), bytes_written, "Encrypted file");

    Ok(SealedFile {
        path,
        key,
        bytes_written,
    })
}

// Temp file in the destination's directory so the final rename stays on
// one filesystem. No destination means a kept file in the temp dir.
async fn stage(dest: Option<&Path>) -> Result<NamedTempFile> {
    let staged = match dest {
        Some(path) => {
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            tokio::fs::create_dir_all(parent).await?;

            tempfile::Builder::new()
                .prefix(STAGING_PREFIX)
                .tempfile_in(parent)?
        }
        None => tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(ENCRYPTED_SUFFIX)
            .tempfile()?,
    };
    Ok(staged)
}

fn open_staged(staged: &NamedTempFile) -> Result<File> {
    Ok(File::from_std(staged.as_file().try_clone()?))
}

fn commit(staged: NamedTempFile, dest: Option<&Path>) -> Result<PathBuf> {
    match dest {
        Some(path) => {
            staged.persist(path).map_err(|e| e.error)?;
            Ok(path.to_path_buf())
        }
        None => {
            let (_, path) = staged.keep().map_err(|e| e.error)?;
            Ok(path)
        }
    }
}
