//! Error types
//!
//! Defines domain-specific error types for each module of the transfer server.

use std::fmt;
use std::io;

/// Path sanitizer errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    Empty,
    Escapes(String),
    IllegalCharacter(String),
}

impl fmt::Display for SanitizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitizeError::Empty => write!(f, "Empty path"),
            SanitizeError::Escapes(p) => write!(f, "Path escapes storage root: {}", p),
            SanitizeError::IllegalCharacter(p) => write!(f, "Illegal character in path: {:?}", p),
        }
    }
}

impl std::error::Error for SanitizeError {}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    NotFound(String),
    NotAFile(String),
    NotADirectory(String),
    FileTooLarge { path: String, limit: u64 },
    InvalidPath(SanitizeError),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(p) => write!(f, "File not found: {}", p),
            StorageError::NotAFile(p) => write!(f, "Not a regular file: {}", p),
            StorageError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            StorageError::FileTooLarge { path, limit } => {
                write!(f, "File {} exceeds the {} byte limit", path, limit)
            }
            StorageError::InvalidPath(e) => write!(f, "Invalid path: {}", e),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::InvalidPath(e) => Some(e),
            StorageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

impl From<SanitizeError> for StorageError {
    fn from(error: SanitizeError) -> Self {
        StorageError::InvalidPath(error)
    }
}

/// Per-item upload errors
///
/// `Rejected` items never touched the filesystem; `Failed` items did and
/// hit an I/O problem on the way.
#[derive(Debug)]
pub enum UploadError {
    Rejected(SanitizeError),
    Failed(StorageError),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Rejected(e) => write!(f, "Upload rejected: {}", e),
            UploadError::Failed(e) => write!(f, "Upload failed: {}", e),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<SanitizeError> for UploadError {
    fn from(error: SanitizeError) -> Self {
        UploadError::Rejected(error)
    }
}

impl From<StorageError> for UploadError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::InvalidPath(e) => UploadError::Rejected(e),
            other => UploadError::Failed(other),
        }
    }
}

impl From<io::Error> for UploadError {
    fn from(error: io::Error) -> Self {
        UploadError::Failed(StorageError::IoError(error))
    }
}

/// General server error that encompasses all error types
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    Storage(StorageError),
    IoError(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Storage(e) => write!(f, "Storage error: {}", e),
            ServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<StorageError> for ServerError {
    fn from(error: StorageError) -> Self {
        ServerError::Storage(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::IoError(error)
    }
}
