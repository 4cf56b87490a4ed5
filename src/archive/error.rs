//! Error types for archive encoding.

use thiserror::Error;

/// Errors that can occur while encoding an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Entry path is empty, contains a NUL byte, or climbs out of the root.
    #[error("invalid archive path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path as supplied.
        path: String,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// Entry content does not fit the 11-digit octal size field.
    #[error("entry {path} is too large for a ustar header ({size} bytes)")]
    EntryTooLarge {
        /// Entry path.
        path: String,
        /// Content size in bytes.
        size: u64,
    },

    /// The compression pass failed.
    #[error("compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

impl ArchiveError {
    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
        }
    }
}
