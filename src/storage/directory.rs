//! Storage directory management
//!
//! Owns the storage root: creates it and any parent folders on demand,
//! lists what is directly inside it, and maps sanitized paths onto it.

use log::{debug, error, info};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::StorageError;
use crate::storage::results::{ListResult, ListedEntry};
use crate::storage::validation::RelativePath;

/// Name prefix of files still being written by an upload
pub const TEMP_FILE_PREFIX: &str = ".";
/// Name suffix of files still being written by an upload
pub const TEMP_FILE_SUFFIX: &str = ".part";

/// Whether `name` is an in-flight (or abandoned) upload temp file
pub fn is_temp_file_name(name: &str) -> bool {
    name.len() > TEMP_FILE_PREFIX.len() + TEMP_FILE_SUFFIX.len()
        && name.starts_with(TEMP_FILE_PREFIX)
        && name.ends_with(TEMP_FILE_SUFFIX)
}

/// The single shared directory all transferred files live under
#[derive(Debug, Clone)]
pub struct StorageDirectory {
    root: PathBuf,
}

impl StorageDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root and its ancestors if missing. Safe to call repeatedly.
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            error!("Failed to create storage root {}: {}", self.root.display(), e);
            StorageError::from(e)
        })?;

        let metadata = fs::metadata(&self.root).await?;
        if !metadata.is_dir() {
            return Err(StorageError::NotADirectory(self.root.display().to_string()));
        }

        info!("Storage root ready at {}", self.root.display());
        Ok(())
    }

    /// Creates every folder above `path` under the root. Safe to call repeatedly.
    pub async fn ensure_parents(&self, path: &RelativePath) -> Result<(), StorageError> {
        let parents = path.parent_segments();
        if parents.is_empty() {
            return Ok(());
        }

        let dir: PathBuf = parents.iter().fold(self.root.clone(), |dir, segment| dir.join(segment));
        fs::create_dir_all(&dir).await.map_err(|e| {
            error!("Failed to create directory {}: {}", dir.display(), e);
            StorageError::from(e)
        })?;

        debug!("Ensured parent directories for {}", path);
        Ok(())
    }

    /// Joins a sanitized path onto the root
    pub fn resolve(&self, path: &RelativePath) -> PathBuf {
        self.root.join(path.to_path_buf())
    }

    /// Names of the entries directly under the root, sorted
    pub async fn list_immediate(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.list_entries().await?.names())
    }

    /// Entries directly under the root with their kind and size, sorted by name
    pub async fn list_entries(&self) -> Result<ListResult, StorageError> {
        let mut dir = fs::read_dir(&self.root).await.map_err(|e| {
            error!("Failed to list storage root {}: {}", self.root.display(), e);
            StorageError::from(e)
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_temp_file_name(&name) {
                continue;
            }

            // Entries can vanish between read_dir and metadata
            let (is_dir, size) = match entry.metadata().await {
                Ok(metadata) if metadata.is_dir() => (true, 0),
                Ok(metadata) => (false, metadata.len()),
                Err(_) => (false, 0),
            };

            entries.push(ListedEntry { name, is_dir, size });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(
            "Listed storage root {} - {} entries",
            self.root.display(),
            entries.len()
        );

        Ok(ListResult { entries })
    }

    /// Whether `path`, once symlinks are followed, is still under the root.
    ///
    /// Returns `Ok(false)` when `path` does not exist.
    pub async fn contains(&self, path: &Path) -> Result<bool, StorageError> {
        let canonical = match fs::canonicalize(path).await {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let root = fs::canonicalize(&self.root).await?;

        Ok(canonical.starts_with(&root) && canonical != root)
    }
}
