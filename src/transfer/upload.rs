//! File uploads
//!
//! Writes client-supplied files under the storage root. Each item is
//! written to its own hidden temporary file in the target folder and
//! renamed into place once complete. A re-upload replaces the old file in
//! one step, concurrent uploads of one path never interleave, and an
//! interrupted upload never leaves a truncated file under the real name.

use log::{debug, info};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::error::handlers::handle_upload_error;
use crate::error::{StorageError, UploadError};
use crate::storage::{RelativePath, StorageDirectory, TEMP_FILE_PREFIX, TEMP_FILE_SUFFIX, sanitize};
use crate::transfer::results::{StoreResult, UploadSummary};

const BUFFER_SIZE: usize = 8192;

/// One file of an upload batch
pub struct UploadItem<R> {
    /// Path declared by the client, possibly containing folders
    pub client_path: String,
    pub content: R,
}

impl<R> UploadItem<R> {
    pub fn new(client_path: impl Into<String>, content: R) -> Self {
        Self {
            client_path: client_path.into(),
            content,
        }
    }
}

/// Stores every item of a batch, best effort.
///
/// A rejected or failed item is logged and counted; the remaining items are
/// still processed and files already written stay in place.
pub async fn handle_upload<R>(
    storage: &StorageDirectory,
    items: Vec<UploadItem<R>>,
    max_file_bytes: u64,
) -> UploadSummary
where
    R: AsyncRead + Unpin,
{
    let mut summary = UploadSummary::default();

    for UploadItem { client_path, content } in items {
        let outcome = store_item(storage, &client_path, content, max_file_bytes).await;
        if let Err(e) = &outcome {
            handle_upload_error(&client_path, e);
        }
        summary.record(&outcome);
    }

    info!(
        "Upload batch finished: {} accepted, {} rejected, {} failed",
        summary.accepted, summary.rejected, summary.failed
    );

    summary
}

/// Sanitizes `client_path`, creates its folders, and writes `content` there,
/// replacing any existing file.
pub async fn store_item<R>(
    storage: &StorageDirectory,
    client_path: &str,
    mut content: R,
    max_file_bytes: u64,
) -> Result<StoreResult, UploadError>
where
    R: AsyncRead + Unpin,
{
    let relative_path = sanitize(client_path)?;
    storage.ensure_parents(&relative_path).await?;

    let file_path = storage.resolve(&relative_path);
    let parent = file_path.parent().unwrap_or_else(|| storage.root());

    // Each call gets its own temp file so concurrent uploads of one path never share an inode
    let temp_file = tempfile::Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .suffix(TEMP_FILE_SUFFIX)
        .tempfile_in(parent)
        .map_err(StorageError::from)?;
    let (std_file, temp_path) = temp_file.into_parts();
    let mut file = File::from_std(std_file);

    // On any error below `temp_path` is dropped, which deletes the temp file
    let bytes_written =
        write_temp_file(&mut content, &mut file, &temp_path, &relative_path, max_file_bytes)
            .await?;
    drop(file);

    temp_path
        .persist(&file_path)
        .map_err(|e| StorageError::IoError(e.error))?;

    info!(
        "Stored {} ({} bytes) at {}",
        relative_path,
        bytes_written,
        file_path.display()
    );

    Ok(StoreResult {
        relative_path,
        file_path,
        bytes_written,
    })
}

/// Streams `content` into `temp_path`, enforcing the size limit as it goes
async fn write_temp_file<R>(
    content: &mut R,
    temp_file: &mut File,
    temp_path: &Path,
    relative_path: &RelativePath,
    max_file_bytes: u64,
) -> Result<u64, StorageError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = content.read(&mut buffer).await?;
        if n == 0 {
            break;
        }

        total += n as u64;
        if total > max_file_bytes {
            return Err(StorageError::FileTooLarge {
                path: relative_path.to_string(),
                limit: max_file_bytes,
            });
        }

        temp_file.write_all(&buffer[..n]).await?;
    }

    temp_file.flush().await?;
    debug!("Wrote {} bytes to {}", total, temp_path.display());

    Ok(total)
}
