//! Archive assembly and compression.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, instrument, warn};

use super::entry::{ArchiveEntry, DEFAULT_DIR_MODE, EntryKind};
use super::error::ArchiveError;
use super::header::{BLOCK_SIZE, MAX_OCTAL_11, encode_header, split_path};
use crate::paths::ancestor_dirs;

/// Encodes entry lists into ustar streams.
///
/// Ancestor directories are synthesized from the file paths, sorted, and
/// written ahead of the files. Entries without their own modification time
/// take the encoder's default.
#[derive(Debug, Clone, Copy)]
pub struct TarEncoder {
    default_mtime: u64,
}

impl TarEncoder {
    /// Creates an encoder stamping undated entries with `default_mtime`.
    #[must_use]
    pub fn new(default_mtime: u64) -> Self {
        Self { default_mtime }
    }

    /// Creates an encoder stamping undated entries with the current time.
    #[must_use]
    pub fn with_current_time() -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::new(now)
    }

    /// Default modification time for undated entries.
    #[must_use]
    pub fn default_mtime(&self) -> u64 {
        self.default_mtime
    }

    /// Encodes `entries` into an uncompressed ustar stream.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidPath`] for empty, NUL-bearing, `..`,
    /// or duplicate file paths, and [`ArchiveError::EntryTooLarge`] for
    /// content that does not fit the size field.
    #[instrument(level = "debug", skip(self, entries), fields(entries = entries.len()))]
    pub fn encode(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
        let layout = plan_layout(entries)?;

        let content_bytes: usize = layout
            .files
            .iter()
            .map(|(_, entry)| padded_len(entry.content.len()))
            .sum();
        let mut out = Vec::with_capacity(
            (layout.directories.len() + layout.files.len() + 2) * BLOCK_SIZE + content_bytes,
        );

        for (dir, meta) in &layout.directories {
            let path = format!("{dir}/");
            self.note_synthetic(&path);
            let header = encode_header(
                &path,
                EntryKind::Directory,
                0,
                meta.mode,
                meta.modified_time.unwrap_or(self.default_mtime),
            );
            out.extend_from_slice(&header);
        }

        for (path, entry) in &layout.files {
            self.note_synthetic(path);
            let header = encode_header(
                path,
                EntryKind::File,
                entry.content.len() as u64,
                entry.mode,
                entry.modified_time.unwrap_or(self.default_mtime),
            );
            out.extend_from_slice(&header);
            out.extend_from_slice(&entry.content);
            let padding = padded_len(entry.content.len()) - entry.content.len();
            out.resize(out.len() + padding, 0);
        }

        out.resize(out.len() + 2 * BLOCK_SIZE, 0);

        debug!(
            directories = layout.directories.len(),
            files = layout.files.len(),
            bytes = out.len(),
            "archive encoded"
        );
        Ok(out)
    }

    /// Encodes `entries` and gzips the result at maximum compression.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`encode`](Self::encode) and
    /// [`ArchiveError::Compression`] if the gzip pass fails.
    pub fn encode_gzip(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
        let tar = self.encode(entries)?;
        compress(&tar)
    }

    fn note_synthetic(&self, path: &str) {
        if split_path(path).synthetic {
            warn!(path = %path, "path too long for ustar header, using synthetic name");
        }
    }
}

impl Default for TarEncoder {
    fn default() -> Self {
        Self::with_current_time()
    }
}

/// Gzips `data` in one pass at maximum compression.
///
/// # Errors
///
/// Returns [`ArchiveError::Compression`] if the encoder fails.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::best());
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;
    debug!(
        raw = data.len(),
        compressed = compressed.len(),
        "archive compressed"
    );
    Ok(compressed)
}

/// Normalizes an entry path to POSIX form without a trailing slash.
///
/// Backslashes become `/`; empty and `.` segments are dropped.
///
/// # Errors
///
/// Returns [`ArchiveError::InvalidPath`] for paths that are empty after
/// normalization, contain a NUL byte, or contain a `..` segment.
pub fn normalize_path(raw: &str) -> Result<String, ArchiveError> {
    if raw.contains('\0') {
        return Err(ArchiveError::invalid_path(raw, "contains a NUL byte"));
    }
    let replaced = raw.replace('\\', "/");
    let mut segments = Vec::new();
    for segment in replaced.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(ArchiveError::invalid_path(raw, "contains a `..` segment")),
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(ArchiveError::invalid_path(raw, "is empty"));
    }
    Ok(segments.join("/"))
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

#[derive(Debug, Clone, Copy)]
struct DirMeta {
    mode: u32,
    modified_time: Option<u64>,
}

impl Default for DirMeta {
    fn default() -> Self {
        Self {
            mode: DEFAULT_DIR_MODE,
            modified_time: None,
        }
    }
}

struct Layout<'a> {
    directories: BTreeMap<String, DirMeta>,
    files: Vec<(String, &'a ArchiveEntry)>,
}

fn plan_layout(entries: &[ArchiveEntry]) -> Result<Layout<'_>, ArchiveError> {
    let mut directories: BTreeMap<String, DirMeta> = BTreeMap::new();
    let mut files = Vec::new();
    let mut file_paths = HashSet::new();

    for entry in entries {
        let path = normalize_path(&entry.path)?;
        match entry.kind {
            EntryKind::Directory => {
                for ancestor in ancestor_dirs(&path) {
                    directories.entry(ancestor.to_string()).or_default();
                }
                directories.insert(
                    path,
                    DirMeta {
                        mode: entry.mode,
                        modified_time: entry.modified_time,
                    },
                );
            }
            EntryKind::File => {
                let size = entry.content.len() as u64;
                if size > MAX_OCTAL_11 {
                    return Err(ArchiveError::EntryTooLarge { path, size });
                }
                for ancestor in ancestor_dirs(&path) {
                    directories.entry(ancestor.to_string()).or_default();
                }
                if !file_paths.insert(path.clone()) {
                    return Err(ArchiveError::invalid_path(path, "duplicate file path"));
                }
                files.push((path, entry));
            }
        }
    }

    if let Some(clash) = file_paths.iter().find(|p| directories.contains_key(*p)) {
        return Err(ArchiveError::invalid_path(
            clash.clone(),
            "used as both a file and a directory",
        ));
    }

    Ok(Layout { directories, files })
}
