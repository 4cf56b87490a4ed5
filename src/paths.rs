//! Path sanitization and archive-wide path deduplication.
//!
//! Every path written into an archive is built from untrusted strings
//! (article titles, hostnames, URL path segments, server-supplied filenames).
//! The helpers here turn those into bounded, filesystem-safe segments and
//! guarantee that no two entries share a path.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

/// Maximum length (in characters) of a human-facing path segment.
pub const MAX_SEGMENT_CHARS: usize = 80;

/// Maximum length (in characters) of a downloaded asset filename.
pub const MAX_FILENAME_CHARS: usize = 120;

/// Highest numeric suffix tried by [`dedupe_path`] before hashing.
const MAX_DEDUPE_ATTEMPTS: usize = 999;

/// Sanitizes a single path segment, truncating to [`MAX_SEGMENT_CHARS`].
///
/// Control characters are removed, `\ / : * ? " < > |` become `_`,
/// whitespace runs collapse to a single space and the result is trimmed.
/// The dot segments `.` and `..` are rewritten to underscores so the result
/// can never escape its parent directory.
#[must_use]
pub fn sanitize_segment(raw: &str) -> String {
    sanitize_segment_with_limit(raw, MAX_SEGMENT_CHARS)
}

/// Sanitizes a single path segment with an explicit character limit.
#[must_use]
pub fn sanitize_segment_with_limit(raw: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if ch.is_control() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(match ch {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        });
    }

    let truncated: String = out.chars().take(max_chars).collect();
    let trimmed = truncated.trim();
    match trimmed {
        "." => "_".to_string(),
        ".." => "__".to_string(),
        other => other.to_string(),
    }
}

/// Sanitizes a slash-separated path segment by segment.
///
/// Backslashes are treated as separators; segments that sanitize to nothing
/// are dropped.
#[must_use]
pub fn sanitize_path(raw: &str) -> String {
    raw.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(sanitize_segment)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reserves a unique path in `used`, returning the reserved value.
///
/// Unused paths are returned unchanged. Collisions get `_2`, `_3`, ...
/// inserted before the extension of the final segment; once those are
/// exhausted a short content hash is used instead.
pub fn dedupe_path(path: &str, used: &mut HashSet<String>) -> String {
    if used.insert(path.to_string()) {
        return path.to_string();
    }

    let (stem, ext) = split_extension(path);
    for i in 2..=MAX_DEDUPE_ATTEMPTS {
        let candidate = format!("{stem}_{i}{ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
    }

    let mut salt = 0usize;
    loop {
        let seed = if salt == 0 {
            path.to_string()
        } else {
            format!("{path}#{salt}")
        };
        let candidate = format!("{stem}_{}{ext}", short_hash(&seed));
        if used.insert(candidate.clone()) {
            return candidate;
        }
        salt += 1;
    }
}

/// Splits `path` into `(stem, extension)` looking only at its final segment.
///
/// The extension keeps its leading dot. Dot-files such as `.gitignore` and
/// names ending in a dot have no extension.
#[must_use]
pub fn split_extension(path: &str) -> (&str, &str) {
    let name_start = path.rfind('/').map_or(0, |pos| pos + 1);
    let name = &path[name_start..];
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => path.split_at(name_start + dot),
        _ => (path, ""),
    }
}

/// Every ancestor directory of `path`, shortest first.
pub fn ancestor_dirs(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(index, _)| &path[..index])
}

/// Returns the first eight lowercase hex characters of the SHA-256 of `value`.
#[must_use]
pub fn short_hash(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(8);
    hex
}
