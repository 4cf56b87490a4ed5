//! Byte-exact ustar header encoding.
//!
//! Layout (offset, width):
//!
//! | field    | off | len | encoding                          |
//! |----------|-----|-----|-----------------------------------|
//! | name     |   0 | 100 | bytes, NUL padded                 |
//! | mode     | 100 |   8 | 7 octal digits + NUL              |
//! | uid/gid  | 108 |   8 | 7 octal digits + NUL (zero)       |
//! | size     | 124 |  12 | 11 octal digits + NUL             |
//! | mtime    | 136 |  12 | 11 octal digits + NUL             |
//! | checksum | 148 |   8 | 6 octal digits + NUL + space      |
//! | typeflag | 156 |   1 | `'0'` file, `'5'` directory       |
//! | magic    | 257 |   6 | `"ustar\0"`                       |
//! | version  | 263 |   2 | `"00"`                            |
//! | uname    | 265 |  32 | `"root"`                          |
//! | gname    | 297 |  32 | `"root"`                          |
//! | devmajor | 329 |   8 | zero                              |
//! | devminor | 337 |   8 | zero                              |
//! | prefix   | 345 | 155 | bytes, NUL padded                 |
//!
//! All numeric fields are octal ASCII, never binary.

use super::entry::EntryKind;
use crate::paths::short_hash;

/// Size of one archive block.
pub const BLOCK_SIZE: usize = 512;

/// Capacity of the `name` field.
pub const NAME_LEN: usize = 100;

/// Capacity of the `prefix` field.
pub const PREFIX_LEN: usize = 155;

/// Largest value an 11-digit octal field can hold.
pub const MAX_OCTAL_11: u64 = 0o777_7777_7777;

const MODE_OFFSET: usize = 100;
const UID_OFFSET: usize = 108;
const GID_OFFSET: usize = 116;
const SIZE_OFFSET: usize = 124;
const MTIME_OFFSET: usize = 136;
const CHECKSUM_OFFSET: usize = 148;
const TYPEFLAG_OFFSET: usize = 156;
const MAGIC_OFFSET: usize = 257;
const VERSION_OFFSET: usize = 263;
const UNAME_OFFSET: usize = 265;
const GNAME_OFFSET: usize = 297;
const DEVMAJOR_OFFSET: usize = 329;
const DEVMINOR_OFFSET: usize = 337;
const PREFIX_OFFSET: usize = 345;

const OWNER_NAME: &[u8] = b"root";

/// Where a path landed in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPath {
    /// Content of the `name` field.
    pub name: String,
    /// Content of the `prefix` field; empty when unused.
    pub prefix: String,
    /// True when the path could not be split and a synthetic name was used.
    pub synthetic: bool,
}

/// Fits a normalized path into the `name`/`prefix` fields.
///
/// Paths of at most 100 bytes go into `name` whole. Longer paths are split
/// at the rightmost `/` that leaves a non-empty name of at most 100 bytes and
/// a prefix of at most 155 bytes. Paths with no such split get the synthetic
/// name `path_{hash8}` (directories keep their trailing slash).
#[must_use]
pub fn split_path(path: &str) -> HeaderPath {
    if path.len() <= NAME_LEN {
        return HeaderPath {
            name: path.to_string(),
            prefix: String::new(),
            synthetic: false,
        };
    }

    // A directory's trailing slash belongs to the name, never a split point.
    let searchable = path.strip_suffix('/').unwrap_or(path);
    for (index, _) in searchable.rmatch_indices('/') {
        let name = &path[index + 1..];
        if name.len() > NAME_LEN {
            break;
        }
        let prefix = &path[..index];
        if !prefix.is_empty() && prefix.len() <= PREFIX_LEN {
            return HeaderPath {
                name: name.to_string(),
                prefix: prefix.to_string(),
                synthetic: false,
            };
        }
    }

    let suffix = if path.ends_with('/') { "/" } else { "" };
    HeaderPath {
        name: format!("path_{}{suffix}", short_hash(path)),
        prefix: String::new(),
        synthetic: true,
    }
}

/// Encodes one 512-byte header block.
///
/// `path` must already be normalized (directories end with `/`) and `size`
/// must not exceed [`MAX_OCTAL_11`]; the encoder checks both.
#[must_use]
pub fn encode_header(
    path: &str,
    kind: EntryKind,
    size: u64,
    mode: u32,
    modified_time: u64,
) -> [u8; BLOCK_SIZE] {
    let mut header = [0u8; BLOCK_SIZE];
    let fields = split_path(path);

    write_bytes(&mut header[..NAME_LEN], fields.name.as_bytes());
    write_octal(&mut header[MODE_OFFSET..MODE_OFFSET + 8], u64::from(mode & 0o7777));
    write_octal(&mut header[UID_OFFSET..UID_OFFSET + 8], 0);
    write_octal(&mut header[GID_OFFSET..GID_OFFSET + 8], 0);
    write_octal(&mut header[SIZE_OFFSET..SIZE_OFFSET + 12], size);
    write_octal(
        &mut header[MTIME_OFFSET..MTIME_OFFSET + 12],
        modified_time.min(MAX_OCTAL_11),
    );
    header[TYPEFLAG_OFFSET] = match kind {
        EntryKind::File => b'0',
        EntryKind::Directory => b'5',
    };
    write_bytes(&mut header[MAGIC_OFFSET..MAGIC_OFFSET + 6], b"ustar\0");
    write_bytes(&mut header[VERSION_OFFSET..VERSION_OFFSET + 2], b"00");
    write_bytes(&mut header[UNAME_OFFSET..UNAME_OFFSET + 32], OWNER_NAME);
    write_bytes(&mut header[GNAME_OFFSET..GNAME_OFFSET + 32], OWNER_NAME);
    write_octal(&mut header[DEVMAJOR_OFFSET..DEVMAJOR_OFFSET + 8], 0);
    write_octal(&mut header[DEVMINOR_OFFSET..DEVMINOR_OFFSET + 8], 0);
    write_bytes(
        &mut header[PREFIX_OFFSET..PREFIX_OFFSET + PREFIX_LEN],
        fields.prefix.as_bytes(),
    );

    write_checksum(&mut header);
    header
}

/// Sums the header with the checksum field read as eight spaces.
#[must_use]
pub fn header_checksum(header: &[u8; BLOCK_SIZE]) -> u32 {
    header
        .iter()
        .enumerate()
        .map(|(i, &byte)| {
            if (CHECKSUM_OFFSET..CHECKSUM_OFFSET + 8).contains(&i) {
                u32::from(b' ')
            } else {
                u32::from(byte)
            }
        })
        .sum()
}

fn write_checksum(header: &mut [u8; BLOCK_SIZE]) {
    header[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 8].fill(b' ');
    let sum = header_checksum(header);
    let digits = format!("{sum:06o}");
    write_bytes(
        &mut header[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 6],
        digits.as_bytes(),
    );
    header[CHECKSUM_OFFSET + 6] = 0;
    header[CHECKSUM_OFFSET + 7] = b' ';
}

/// Writes `value` as zero-padded octal filling all but the last byte, which
/// stays NUL.
fn write_octal(field: &mut [u8], value: u64) {
    let width = field.len() - 1;
    let digits = format!("{value:0width$o}");
    write_bytes(&mut field[..width], digits.as_bytes());
    field[width] = 0;
}

fn write_bytes(field: &mut [u8], value: &[u8]) {
    let len = value.len().min(field.len());
    field[..len].copy_from_slice(&value[..len]);
}
