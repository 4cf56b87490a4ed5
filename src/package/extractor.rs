//! Boundary with the article extractor.
//!
//! Fetching pages and turning HTML into text happen elsewhere. The packager
//! only needs, per URL, the extracted text and the absolute asset URLs it
//! references, or an error message.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::download::AssetDescriptor;

/// Absolute asset URLs discovered in extracted content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUrls {
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Downloadable document URLs.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Successful extraction of one article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedArticle {
    /// Article title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Byline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Publication date as found on the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Markdown body.
    #[serde(default)]
    pub text: String,
    /// Assets referenced by `text`.
    #[serde(default)]
    pub asset_urls: AssetUrls,
}

impl ExtractedArticle {
    /// Asset references, images first, in discovery order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<AssetDescriptor> {
        self.asset_urls
            .images
            .iter()
            .map(AssetDescriptor::image)
            .chain(self.asset_urls.files.iter().map(AssetDescriptor::file))
            .collect()
    }
}

/// Extraction failure for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The extractor reported an error.
    #[error("{message}")]
    Failed {
        /// URL that failed.
        url: String,
        /// Extractor message.
        message: String,
    },

    /// The extractor has nothing for this URL.
    #[error("no extraction result for {url}")]
    Missing {
        /// URL without a result.
        url: String,
    },
}

impl ExtractionError {
    /// Creates a reported failure.
    pub fn failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Produces extracted content for a URL.
///
/// Uses `async_trait` so packagers can hold `&dyn Extractor`.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extracts the article at `url`.
    async fn extract(&self, url: &str) -> Result<ExtractedArticle, ExtractionError>;
}

/// One pre-extracted record as read from JSON.
///
/// Either an article (`text`, `assetUrls`, ...) or `{ "url", "error" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    /// Source URL.
    pub url: String,
    /// Extraction error; when present the article fields are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Extracted article.
    #[serde(flatten)]
    pub article: ExtractedArticle,
}

/// Extractor serving results that were extracted ahead of time.
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    order: Vec<String>,
    results: HashMap<String, Result<ExtractedArticle, String>>,
}

impl StaticExtractor {
    /// Creates an empty extractor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an extractor from records; a later record for the same URL wins.
    #[must_use]
    pub fn from_records(records: Vec<ExtractionRecord>) -> Self {
        let mut extractor = Self::new();
        for record in records {
            match record.error {
                Some(error) => extractor.insert_error(record.url, error),
                None => extractor.insert_article(record.url, record.article),
            }
        }
        extractor
    }

    /// Parses a JSON array of [`ExtractionRecord`]s.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<ExtractionRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Registers a successful extraction.
    pub fn insert_article(&mut self, url: impl Into<String>, article: ExtractedArticle) {
        self.insert(url.into(), Ok(article));
    }

    /// Registers a failed extraction.
    pub fn insert_error(&mut self, url: impl Into<String>, message: impl Into<String>) {
        self.insert(url.into(), Err(message.into()));
    }

    /// URLs in first-insertion order.
    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.order
    }

    fn insert(&mut self, url: String, result: Result<ExtractedArticle, String>) {
        if !self.results.contains_key(&url) {
            self.order.push(url.clone());
        }
        self.results.insert(url, result);
    }
}

#[async_trait]
impl Extractor for StaticExtractor {
    #[tracing::instrument(level = "debug", skip(self), fields(extractor = "static"))]
    async fn extract(&self, url: &str) -> Result<ExtractedArticle, ExtractionError> {
        match self.results.get(url.trim()) {
            Some(Ok(article)) => Ok(article.clone()),
            Some(Err(message)) => Err(ExtractionError::failed(url, message.clone())),
            None => Err(ExtractionError::Missing {
                url: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::download::AssetKind;

    const RECORDS: &str = r#"[
        {
            "url": "https://example.com/a",
            "title": "First",
            "text": "Body ![x](https://cdn.example.com/x.png)",
            "assetUrls": { "images": ["https://cdn.example.com/x.png"], "files": ["https://example.com/a.pdf"] }
        },
        { "url": "https://example.com/b", "error": "HTTP 503" }
    ]"#;

    #[tokio::test]
    async fn test_static_extractor_from_json() {
        let extractor = StaticExtractor::from_json(RECORDS).unwrap();
        assert_eq!(
            extractor.urls(),
            ["https://example.com/a".to_string(), "https://example.com/b".to_string()]
        );

        let article = extractor.extract("https://example.com/a").await.unwrap();
        assert_eq!(article.title.as_deref(), Some("First"));
        assert_eq!(article.asset_urls.images.len(), 1);
        assert_eq!(article.asset_urls.files.len(), 1);

        let failed = extractor.extract("https://example.com/b").await.unwrap_err();
        assert_eq!(failed.to_string(), "HTTP 503");
    }

    #[tokio::test]
    async fn test_static_extractor_missing_url() {
        let extractor = StaticExtractor::new();
        let err = extractor.extract("https://nowhere.example/").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Missing { .. }));
    }

    #[test]
    fn test_record_without_asset_urls_defaults_to_empty() {
        let extractor =
            StaticExtractor::from_json(r#"[{ "url": "https://e.com/", "text": "hi" }]"#).unwrap();
        assert_eq!(extractor.urls().len(), 1);
    }

    #[test]
    fn test_descriptors_images_then_files() {
        let article = ExtractedArticle {
            asset_urls: AssetUrls {
                images: vec!["https://e.com/1.png".to_string()],
                files: vec!["https://e.com/2.pdf".to_string()],
            },
            ..ExtractedArticle::default()
        };
        let kinds: Vec<AssetKind> = article.descriptors().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![AssetKind::Image, AssetKind::File]);
    }
}
