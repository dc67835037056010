//! Path validation
//!
//! Turns client-supplied file names into paths that cannot leave the
//! storage root once joined to it.

use std::fmt;
use std::path::PathBuf;

use crate::error::SanitizeError;

/// A sanitized path relative to the storage root.
///
/// Only [`sanitize`] constructs one. It always holds at least one segment
/// and no segment is empty, `.`, `..`, or contains a separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath {
    segments: Vec<String>,
}

impl RelativePath {
    /// Path segments from the root downwards
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, used as the suggested download name
    pub fn file_name(&self) -> &str {
        // Non-empty by construction
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Segments above the file name
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// Native relative path built from the segments
    pub fn to_path_buf(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Validate and normalize a client-supplied relative path.
///
/// Both `/` and `\` separate segments. Empty and `.` segments are dropped and
/// `..` removes the preceding segment; a `..` with nothing left to remove,
/// a leading separator, or a drive prefix in any segment is an escape attempt.
pub fn sanitize(client_path: &str) -> Result<RelativePath, SanitizeError> {
    if client_path.trim().is_empty() {
        return Err(SanitizeError::Empty);
    }

    if client_path.contains('\0') {
        return Err(SanitizeError::IllegalCharacter(client_path.to_string()));
    }

    if client_path.starts_with('/') || client_path.starts_with('\\') {
        return Err(SanitizeError::Escapes(client_path.to_string()));
    }

    let mut segments: Vec<String> = Vec::new();

    for segment in client_path.split(['/', '\\']) {
        if has_drive_prefix(segment) || has_windows_stream_marker(segment) {
            return Err(SanitizeError::Escapes(client_path.to_string()));
        }

        match segment {
            "" | "." => continue,
            ".." => {
                if segments.pop().is_none() {
                    return Err(SanitizeError::Escapes(client_path.to_string()));
                }
            }
            name => segments.push(name.to_string()),
        }
    }

    if segments.is_empty() {
        return Err(SanitizeError::Empty);
    }

    Ok(RelativePath { segments })
}

/// `C:` style prefix, which Windows treats as absolute or drive-relative
/// wherever it appears in a joined path
fn has_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Any `:` on Windows, which names an alternate data stream or a device
#[cfg(windows)]
fn has_windows_stream_marker(segment: &str) -> bool {
    segment.contains(':')
}

#[cfg(not(windows))]
fn has_windows_stream_marker(_segment: &str) -> bool {
    false
}
