//! Transfer module
//!
//! Handles storing uploaded files and opening stored files for download.

pub mod download;
pub mod results;
pub mod upload;

// Re-export key types and functions
pub use download::handle_download;
pub use results::{DownloadResult, StoreResult, UploadSummary};
pub use upload::{UploadItem, handle_upload, store_item};
