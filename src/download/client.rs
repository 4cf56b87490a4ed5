//! HTTP fetcher for article assets.
//!
//! [`AssetFetcher`] performs one time-bounded GET per asset with browser-like
//! headers and a `Referer` pointing at the originating article, enforces the
//! per-asset and run-wide byte ceilings, and resolves a filename. Nothing
//! here retries.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderValue, REFERER,
};
use tracing::{debug, instrument, warn};
use url::Url;

use super::acquisition::AssetKind;
use super::budget::ByteBudget;
use super::constants::{ACCEPT_HEADER, ACCEPT_LANGUAGE_HEADER};
use super::error::AssetError;
use super::filename::{
    is_html_content_type, is_image_content_type, resolve_filename, url_has_image_extension,
};
use crate::config::PackagerConfig;
use crate::user_agent::BROWSER_USER_AGENT;

/// Asset bytes plus the metadata needed to place them in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    /// Requested URL.
    pub url: String,
    /// Resolved, sanitized filename.
    pub filename: String,
    /// Response body.
    pub content: Vec<u8>,
    /// Served `Content-Type`, if any.
    pub content_type: Option<String>,
}

/// Fetches single assets under a hard timeout and byte ceilings.
///
/// Create one per run and share it; the inner client pools connections.
#[derive(Debug, Clone)]
pub struct AssetFetcher {
    client: Client,
    timeout: Duration,
    max_asset_bytes: u64,
}

impl AssetFetcher {
    /// Builds a fetcher from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the HTTP client cannot be built.
    pub fn new(config: &PackagerConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(config.connect_timeout)?;
        Ok(Self::with_client(
            client,
            config.asset_timeout,
            config.max_asset_bytes,
        ))
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: Client, timeout: Duration, max_asset_bytes: u64) -> Self {
        Self {
            client,
            timeout,
            max_asset_bytes,
        }
    }

    /// Fetches `url`, returning `None` on any failure.
    ///
    /// Failures are logged at `warn` and never retried.
    pub async fn fetch(
        &self,
        url: &str,
        referer: &str,
        kind: AssetKind,
        budget: &ByteBudget,
    ) -> Option<FetchedAsset> {
        match self.try_fetch(url, referer, kind, budget).await {
            Ok(asset) => Some(asset),
            Err(error) => {
                warn!(url = %url, kind = %kind, error = %error, "asset skipped");
                None
            }
        }
    }

    /// Fetches `url`, reporting why it was rejected.
    ///
    /// The timeout covers connecting, headers and the full body. On success
    /// the body size has already been reserved from `budget`.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError`] for invalid URLs, network failures,
    /// timeouts, non-success statuses, disallowed content types, empty
    /// bodies, oversized bodies and exhausted budgets.
    #[instrument(level = "debug", skip(self, referer, budget), fields(url = %url, kind = %kind))]
    pub async fn try_fetch(
        &self,
        url: &str,
        referer: &str,
        kind: AssetKind,
        budget: &ByteBudget,
    ) -> Result<FetchedAsset, AssetError> {
        let parsed = Url::parse(url).map_err(|_| AssetError::invalid_url(url))?;
        match tokio::time::timeout(self.timeout, self.download(&parsed, url, referer, kind, budget))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AssetError::timeout(url, self.timeout)),
        }
    }

    async fn download(
        &self,
        parsed: &Url,
        url: &str,
        referer: &str,
        kind: AssetKind,
        budget: &ByteBudget,
    ) -> Result<FetchedAsset, AssetError> {
        let mut request = self.client.get(parsed.clone());
        if let Ok(value) = HeaderValue::from_str(referer) {
            request = request.header(REFERER, value);
        }
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AssetError::timeout(url, self.timeout)
            } else {
                AssetError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::http_status(url, status.as_u16()));
        }

        let content_type = header_string(response.headers(), CONTENT_TYPE);
        check_content_type(parsed, url, kind, content_type.as_deref())?;

        if response
            .content_length()
            .is_some_and(|len| len > self.max_asset_bytes)
        {
            return Err(AssetError::too_large(url, self.max_asset_bytes));
        }

        let disposition = header_string(response.headers(), CONTENT_DISPOSITION);
        let content = self.read_body(response, url).await?;
        if content.is_empty() {
            return Err(AssetError::empty_body(url));
        }

        let size = content.len() as u64;
        if !budget.try_reserve(size) {
            return Err(AssetError::budget_exhausted(url, size, budget.remaining()));
        }

        let filename = resolve_filename(parsed, disposition.as_deref(), content_type.as_deref(), kind);
        debug!(bytes = size, filename = %filename, "asset fetched");

        Ok(FetchedAsset {
            url: url.to_string(),
            filename,
            content,
            content_type,
        })
    }

    /// Streams the body into memory, stopping as soon as it passes the ceiling.
    async fn read_body(&self, response: reqwest::Response, url: &str) -> Result<Vec<u8>, AssetError> {
        let mut stream = response.bytes_stream();
        let mut content = Vec::new();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| {
                if e.is_timeout() {
                    AssetError::timeout(url, self.timeout)
                } else {
                    AssetError::network(url, e)
                }
            })?;
            if (content.len() + chunk.len()) as u64 > self.max_asset_bytes {
                return Err(AssetError::too_large(url, self.max_asset_bytes));
            }
            content.extend_from_slice(&chunk);
        }
        Ok(content)
    }
}

/// Rejects HTML served for files and non-images served for image URLs.
///
/// An image is accepted when either the served type is `image/*` or the URL
/// path carries an image extension.
fn check_content_type(
    parsed: &Url,
    url: &str,
    kind: AssetKind,
    content_type: Option<&str>,
) -> Result<(), AssetError> {
    let Some(content_type) = content_type else {
        return Ok(());
    };
    let allowed = match kind {
        AssetKind::File => !is_html_content_type(content_type),
        AssetKind::Image => is_image_content_type(content_type) || url_has_image_extension(parsed),
    };
    if allowed {
        Ok(())
    } else {
        Err(AssetError::disallowed_content_type(
            url,
            kind.as_str(),
            content_type,
        ))
    }
}

fn header_string(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

fn build_client(connect_timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_HEADER));
    Client::builder()
        .connect_timeout(connect_timeout)
        .gzip(true)
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .build()
}
