//! Error handlers
//!
//! Maps domain errors onto HTTP status codes and logs them.

use axum::http::StatusCode;
use log::{error, warn};

use crate::error::types::{StorageError, UploadError};

/// Log a storage error at a level matching its severity
pub fn handle_error(err: &StorageError) {
    match error_to_status_code(err) {
        code if code.is_server_error() => error!("Storage error: {}", err),
        _ => warn!("Request failed: {}", err),
    }
}

/// Convert a storage error to the HTTP status returned to the client
pub fn error_to_status_code(err: &StorageError) -> StatusCode {
    match err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::NotAFile(_) => StatusCode::NOT_FOUND,
        StorageError::InvalidPath(_) => StatusCode::NOT_FOUND,
        StorageError::NotADirectory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        StorageError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        StorageError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log a per-item upload error; these never fail the request
pub fn handle_upload_error(client_path: &str, err: &UploadError) {
    match err {
        UploadError::Rejected(e) => warn!("Rejected upload item {:?}: {}", client_path, e),
        UploadError::Failed(e) => error!("Failed to store upload item {:?}: {}", client_path, e),
    }
}
