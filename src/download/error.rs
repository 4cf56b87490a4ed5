//! Error types for asset downloads.
//!
//! Every variant is terminal for one asset only: the acquisition layer logs
//! it and leaves the asset's remote URL in place.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while fetching a single asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The asset URL could not be parsed.
    #[error("invalid asset URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The hard per-asset timeout elapsed.
    #[error("timeout fetching {url} after {seconds}s")]
    Timeout {
        /// The URL that timed out.
        url: String,
        /// Configured timeout in seconds.
        seconds: u64,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The served content type is not acceptable for the asset kind.
    #[error("rejected {kind} asset {url}: content type {content_type}")]
    DisallowedContentType {
        /// The rejected URL.
        url: String,
        /// `image` or `file`.
        kind: &'static str,
        /// The served content type.
        content_type: String,
    },

    /// The response body was empty.
    #[error("empty body fetching {url}")]
    EmptyBody {
        /// The URL with no content.
        url: String,
    },

    /// The body exceeds the per-asset ceiling.
    #[error("asset {url} exceeds the per-asset limit of {limit} bytes")]
    TooLarge {
        /// The oversized URL.
        url: String,
        /// Per-asset ceiling in bytes.
        limit: u64,
    },

    /// Accepting the body would overrun the run's cumulative ceiling.
    #[error("byte budget exhausted: {url} needs {size} bytes, {remaining} remaining")]
    BudgetExhausted {
        /// The URL that was dropped.
        url: String,
        /// Size of the rejected body.
        size: u64,
        /// Bytes left in the run budget at rejection time.
        remaining: u64,
    },
}

impl AssetError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            url: url.into(),
            seconds: timeout.as_secs(),
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a content-type rejection.
    pub fn disallowed_content_type(
        url: impl Into<String>,
        kind: &'static str,
        content_type: impl Into<String>,
    ) -> Self {
        Self::DisallowedContentType {
            url: url.into(),
            kind,
            content_type: content_type.into(),
        }
    }

    /// Creates an empty body error.
    pub fn empty_body(url: impl Into<String>) -> Self {
        Self::EmptyBody { url: url.into() }
    }

    /// Creates a per-asset size error.
    pub fn too_large(url: impl Into<String>, limit: u64) -> Self {
        Self::TooLarge {
            url: url.into(),
            limit,
        }
    }

    /// Creates a run budget error.
    pub fn budget_exhausted(url: impl Into<String>, size: u64, remaining: u64) -> Self {
        Self::BudgetExhausted {
            url: url.into(),
            size,
            remaining,
        }
    }
}
