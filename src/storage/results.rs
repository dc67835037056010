//! Storage result types
//!
//! Defines result structures returned by storage operations.

/// A single entry directly under the storage root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// Result of a directory listing operation
#[derive(Debug, Clone, Default)]
pub struct ListResult {
    pub entries: Vec<ListedEntry>,
}

impl ListResult {
    /// Entry names in listing order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
