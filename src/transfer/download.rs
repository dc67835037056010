//! File downloads

use log::{info, warn};
use std::io;
use tokio::fs::{self, File};

use crate::error::StorageError;
use crate::storage::{StorageDirectory, sanitize};
use crate::transfer::results::DownloadResult;

/// Opens the stored file named by `requested_name` for streaming.
///
/// Anything that is not a regular file inside the storage root (missing,
/// a directory, an escaping path, a symlink pointing outside) is reported
/// as not found.
pub async fn handle_download(
    storage: &StorageDirectory,
    requested_name: &str,
) -> Result<DownloadResult, StorageError> {
    let relative_path = sanitize(requested_name).map_err(|e| {
        warn!("Refused download of {:?}: {}", requested_name, e);
        StorageError::InvalidPath(e)
    })?;

    let file_path = storage.resolve(&relative_path);

    if !storage.contains(&file_path).await? {
        return Err(StorageError::NotFound(relative_path.to_string()));
    }

    let metadata = fs::metadata(&file_path)
        .await
        .map_err(|e| not_found_or_io(e, &relative_path.to_string()))?;
    if !metadata.is_file() {
        return Err(StorageError::NotAFile(relative_path.to_string()));
    }

    let file = File::open(&file_path)
        .await
        .map_err(|e| not_found_or_io(e, &relative_path.to_string()))?;

    info!(
        "Serving {} ({} bytes) from {}",
        relative_path,
        metadata.len(),
        file_path.display()
    );

    Ok(DownloadResult {
        file,
        file_name: relative_path.file_name().to_string(),
        relative_path,
        size: metadata.len(),
    })
}

fn not_found_or_io(error: io::Error, path: &str) -> StorageError {
    if error.kind() == io::ErrorKind::NotFound {
        StorageError::NotFound(path.to_string())
    } else {
        StorageError::IoError(error)
    }
}
