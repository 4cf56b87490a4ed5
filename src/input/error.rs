//! Error types for run-level request validation.

use thiserror::Error;

/// Maximum URL length to accept (standard browser limit).
pub const MAX_URL_LENGTH: usize = 2000;

/// Errors that reject a packaging request before any work begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No URLs were supplied.
    #[error("no URLs supplied\n  Suggestion: Provide at least one http:// or https:// URL")]
    EmptyUrlList,

    /// More URLs were supplied than one run accepts.
    #[error("too many URLs ({count}, max {max})\n  Suggestion: Split the list into smaller batches")]
    TooManyUrls {
        /// Number of URLs supplied.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// URL is malformed or uses an unsupported scheme.
    #[error("invalid URL '{url}': {reason}\n  Suggestion: {suggestion}")]
    InvalidUrl {
        /// The URL that failed validation
        url: String,
        /// Why the URL is invalid
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// URL exceeds maximum allowed length
    #[error("URL too long ({length} chars, max {max}): {url_preview}...")]
    UrlTooLong {
        /// Truncated URL for display
        url_preview: String,
        /// Actual length
        length: usize,
        /// Maximum allowed
        max: usize,
    },
}

impl ValidationError {
    /// Creates an `InvalidUrl` error for a non-web URL scheme.
    #[must_use]
    pub fn unsupported_scheme(url: &str, scheme: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: format!("scheme '{scheme}' is not supported"),
            suggestion: "Use http:// or https:// URLs".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for a malformed URL.
    #[must_use]
    pub fn malformed(url: &str, parse_error: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: parse_error.to_string(),
            suggestion: "Check the URL format and try again".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for a URL without a host.
    #[must_use]
    pub fn no_host(url: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
            suggestion: "Ensure the URL includes a domain (e.g., example.com)".to_string(),
        }
    }

    /// Creates a `UrlTooLong` error for URLs exceeding the maximum length.
    #[must_use]
    pub fn too_long(url: &str) -> Self {
        Self::UrlTooLong {
            url_preview: url.chars().take(50).collect(),
            length: url.len(),
            max: MAX_URL_LENGTH,
        }
    }
}
