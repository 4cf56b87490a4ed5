//! Filename resolution and content-type heuristics for downloaded assets.
//!
//! Resolution order:
//! 1. `Content-Disposition` (`filename*=` percent-encoded form, then `filename=`)
//! 2. Last URL path segment, percent-decoded
//! 3. `{kind}_{hash8}` fallback
//!
//! The result is sanitized, gains an extension from the MIME tables when it
//! has none, and gains a URL hash suffix when the URL carries a query string.

use url::Url;

use super::acquisition::AssetKind;
use super::constants::{
    FILE_EXTENSIONS_BY_MIME, IMAGE_EXTENSIONS_BY_MIME, IMAGE_URL_EXTENSIONS,
    PLACEHOLDER_IMAGE_PATTERNS,
};
use crate::paths::{MAX_FILENAME_CHARS, sanitize_segment_with_limit, short_hash, split_extension};

/// Resolves the local filename for a downloaded asset.
#[must_use]
pub fn resolve_filename(
    url: &Url,
    content_disposition: Option<&str>,
    content_type: Option<&str>,
    kind: AssetKind,
) -> String {
    let fallback = || format!("{}_{}", kind.as_str(), short_hash(url.as_str()));

    let raw = content_disposition
        .and_then(parse_content_disposition)
        .or_else(|| filename_from_url(url))
        .unwrap_or_else(fallback);

    let mut name = sanitize_segment_with_limit(&raw, MAX_FILENAME_CHARS);
    if name.is_empty() {
        name = fallback();
    }

    if split_extension(&name).1.is_empty()
        && let Some(ext) = content_type.and_then(|ct| extension_for_content_type(ct, kind))
    {
        name.push_str(ext);
    }

    if url.query().is_some() {
        let (stem, ext) = split_extension(&name);
        name = format!("{stem}_{}{ext}", short_hash(url.as_str()));
    }

    name
}

/// Parses a `Content-Disposition` header value for a filename.
///
/// Handles:
/// - `attachment; filename="example.pdf"`
/// - `attachment; filename=example.pdf`
/// - `attachment; filename*=UTF-8''%E6%8A%A5%E5%91%8A.pdf` (RFC 5987)
///
/// Parameter names match case-insensitively; the extended form wins.
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    let lower = header.to_ascii_lowercase();

    if let Some(pos) = lower.find("filename*=") {
        let value = header[pos + "filename*=".len()..].trim_start();
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            let encoded_name = encoded[..end].trim().trim_matches('"');
            if let Ok(decoded) = urlencoding::decode(encoded_name)
                && !decoded.trim().is_empty()
            {
                return Some(decoded.into_owned());
            }
        }
    }

    let pos = lower.find("filename=")?;
    let value = header[pos + "filename=".len()..].trim_start();
    let name = if let Some(stripped) = value.strip_prefix('"') {
        let end = stripped.find('"')?;
        &stripped[..end]
    } else {
        let end = value.find(';').unwrap_or(value.len());
        value[..end].trim()
    };
    (!name.is_empty()).then(|| name.to_string())
}

/// Percent-decoded last path segment of `url`, if non-empty.
pub(crate) fn filename_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), |d| d.into_owned());
    (!decoded.trim().is_empty()).then_some(decoded)
}

/// Lowercased MIME type without parameters.
pub(crate) fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Extension for `content_type`, looking in the table for `kind` first.
pub(crate) fn extension_for_content_type(content_type: &str, kind: AssetKind) -> Option<&'static str> {
    let mime = mime_essence(content_type);
    let (primary, secondary) = match kind {
        AssetKind::Image => (IMAGE_EXTENSIONS_BY_MIME, FILE_EXTENSIONS_BY_MIME),
        AssetKind::File => (FILE_EXTENSIONS_BY_MIME, IMAGE_EXTENSIONS_BY_MIME),
    };
    primary
        .iter()
        .chain(secondary)
        .find(|(candidate, _)| *candidate == mime)
        .map(|(_, ext)| *ext)
}

/// True for `text/html` and `application/xhtml+xml`.
pub(crate) fn is_html_content_type(content_type: &str) -> bool {
    matches!(
        mime_essence(content_type).as_str(),
        "text/html" | "application/xhtml+xml"
    )
}

/// True for any `image/*` type.
pub(crate) fn is_image_content_type(content_type: &str) -> bool {
    mime_essence(content_type).starts_with("image/")
}

/// True when the URL path ends in a known image extension.
pub(crate) fn url_has_image_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    IMAGE_URL_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// True for lazy-load placeholders and tracking pixels.
#[must_use]
pub fn is_placeholder_image(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    PLACEHOLDER_IMAGE_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}
