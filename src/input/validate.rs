//! URL list validation.

use tracing::debug;
use url::Url;

use super::error::{MAX_URL_LENGTH, ValidationError};

/// Validates every URL in a packaging request.
///
/// Returns the trimmed URLs in input order. Fails on the first empty list,
/// oversized list, or invalid URL.
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first problem found.
///
/// # Examples
///
/// ```
/// use packager_core::input::validate_urls;
///
/// let urls = validate_urls(&["https://example.com/post".to_string()], 20).unwrap();
/// assert_eq!(urls, vec!["https://example.com/post".to_string()]);
/// assert!(validate_urls(&[], 20).is_err());
/// ```
#[tracing::instrument(skip(urls), fields(count = urls.len()))]
pub fn validate_urls(urls: &[String], max_urls: usize) -> Result<Vec<String>, ValidationError> {
    if urls.is_empty() {
        return Err(ValidationError::EmptyUrlList);
    }
    if urls.len() > max_urls {
        return Err(ValidationError::TooManyUrls {
            count: urls.len(),
            max: max_urls,
        });
    }

    urls.iter()
        .map(|raw| {
            let trimmed = raw.trim();
            validate_url(trimmed)?;
            Ok(trimmed.to_string())
        })
        .collect()
}

/// Validates a single URL.
///
/// # Validation rules:
/// - Must not exceed `MAX_URL_LENGTH` (2000 chars)
/// - Must be parseable by the `url` crate
/// - Must use http or https scheme
/// - Must have a host
///
/// # Errors
///
/// Returns [`ValidationError`] when any rule is violated.
pub fn validate_url(raw: &str) -> Result<Url, ValidationError> {
    if raw.len() > MAX_URL_LENGTH {
        return Err(ValidationError::too_long(raw));
    }

    let parsed = Url::parse(raw).map_err(|e| ValidationError::malformed(raw, &e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(ValidationError::unsupported_scheme(raw, scheme)),
    }

    if parsed.host().is_none() {
        return Err(ValidationError::no_host(raw));
    }

    debug!(url = %parsed, "URL validated");
    Ok(parsed)
}
