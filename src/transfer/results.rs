//! Transfer result types

use std::path::PathBuf;
use tokio::fs::File;

use crate::error::UploadError;
use crate::storage::RelativePath;

/// Result of storing a single uploaded file
#[derive(Debug, Clone)]
pub struct StoreResult {
    pub relative_path: RelativePath,
    pub file_path: PathBuf,
    pub bytes_written: u64,
}

/// Outcome counts for one upload batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Files written to disk
    pub accepted: usize,
    /// Items whose path failed sanitization
    pub rejected: usize,
    /// Items that passed sanitization but could not be written
    pub failed: usize,
}

impl UploadSummary {
    /// Count one item's outcome
    pub fn record(&mut self, outcome: &Result<StoreResult, UploadError>) {
        match outcome {
            Ok(_) => self.accepted += 1,
            Err(UploadError::Rejected(_)) => self.rejected += 1,
            Err(UploadError::Failed(_)) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.accepted + self.rejected + self.failed
    }
}

/// An opened file ready to be streamed back to the client
#[derive(Debug)]
pub struct DownloadResult {
    pub file: File,
    pub relative_path: RelativePath,
    /// Suggested attachment name: the last path segment
    pub file_name: String,
    pub size: u64,
}
