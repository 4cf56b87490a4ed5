//! Deterministic POSIX ustar archive encoding with a gzip pass.
//!
//! The archive is built entirely in memory:
//! - [`EntrySet`] collects file entries under unique paths
//! - [`TarEncoder`] synthesizes parent directories, writes 512-byte headers
//!   and padded content, and terminates the stream with two zero blocks
//! - [`compress`] gzips the finished stream at maximum compression
//!
//! Given the same entries and the same modification time the output is
//! byte-identical.

mod encoder;
mod entry;
mod error;
mod header;

pub use encoder::{TarEncoder, compress, normalize_path};
pub use entry::{ArchiveEntry, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, EntryKind, EntrySet};
pub use error::ArchiveError;
pub use header::{BLOCK_SIZE, HeaderPath, encode_header, header_checksum, split_path};
