//! File system storage management
//!
//! Handles the storage root, directory listing, and path validation.

pub mod directory;
pub mod results;
pub mod validation;

pub use directory::{StorageDirectory, TEMP_FILE_PREFIX, TEMP_FILE_SUFFIX, is_temp_file_name};
pub use results::{ListResult, ListedEntry};
pub use validation::{RelativePath, sanitize};
