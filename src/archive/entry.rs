//! In-memory archive entries.

use std::collections::HashSet;

use super::error::ArchiveError;
use crate::paths::dedupe_path;

/// Default permission bits for regular files.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Default permission bits for directories.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Whether an entry is a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file with content.
    File,
    /// Directory; never carries content.
    Directory,
}

/// A file or directory destined for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Forward-slash separated relative path.
    pub path: String,
    /// File or directory.
    pub kind: EntryKind,
    /// File content; empty for directories.
    pub content: Vec<u8>,
    /// POSIX permission bits.
    pub mode: u32,
    /// Unix timestamp; `None` takes the encoder default.
    pub modified_time: Option<u64>,
}

impl ArchiveEntry {
    /// Creates a regular file entry with default mode.
    pub fn file(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            content: content.into(),
            mode: DEFAULT_FILE_MODE,
            modified_time: None,
        }
    }

    /// Creates a directory entry with default mode.
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            content: Vec::new(),
            mode: DEFAULT_DIR_MODE,
            modified_time: None,
        }
    }

    /// Sets a fixed modification time.
    #[must_use]
    pub fn with_modified_time(mut self, modified_time: u64) -> Self {
        self.modified_time = Some(modified_time);
        self
    }

    /// Returns true for directory entries.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Ordered set of file entries with unique paths.
///
/// Paths added with [`EntrySet::add_file`] go through [`dedupe_path`]
/// against the set's own registry. Paths that were already made unique
/// elsewhere, and may be referenced by content, are added with
/// [`EntrySet::add_reserved`] and are never renamed.
#[derive(Debug, Default)]
pub struct EntrySet {
    entries: Vec<ArchiveEntry>,
    used: HashSet<String>,
}

impl EntrySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, returning the (possibly suffixed) path it was stored under.
    pub fn add_file(&mut self, path: &str, content: impl Into<Vec<u8>>) -> String {
        let unique = dedupe_path(path, &mut self.used);
        self.entries.push(ArchiveEntry::file(unique.clone(), content));
        unique
    }

    /// Adds a file under exactly `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidPath`] if `path` is already in the set.
    pub fn add_reserved(
        &mut self,
        path: &str,
        content: impl Into<Vec<u8>>,
    ) -> Result<(), ArchiveError> {
        if !self.used.insert(path.to_string()) {
            return Err(ArchiveError::invalid_path(path, "duplicate file path"));
        }
        self.entries.push(ArchiveEntry::file(path, content));
        Ok(())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrows the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Consumes the set, yielding its entries in insertion order.
    #[must_use]
    pub fn into_entries(self) -> Vec<ArchiveEntry> {
        self.entries
    }
}
