//! Top-level packaging run.
//!
//! One [`Packager::package`] call validates the URL list, runs extraction
//! jobs through a bounded pool, acquires each job's assets, assembles
//! per-job folders plus `manifest.json`, and encodes the archive once.

use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use super::extractor::{ExtractedArticle, ExtractionError, Extractor};
use super::manifest::{JobRecord, MANIFEST_FILE, Manifest};
use super::state::{JobState, JobTracker};
use crate::archive::{ArchiveError, EntrySet, TarEncoder};
use crate::config::{ConfigError, PackagerConfig};
use crate::download::{
    AcquisitionOptions, AssetAcquirer, AssetFetcher, AssetKind, ByteBudget, rewrite_asset_links,
    run_bounded,
};
use crate::input::{ValidationError, validate_urls};
use crate::paths::sanitize_segment;

/// Document written for a successful job.
pub const INDEX_FILE: &str = "index.md";

/// Placeholder written for a failed job.
pub const ERROR_FILE: &str = "error.md";

/// Folder name used when neither title nor host yields a usable name.
const FALLBACK_FOLDER_NAME: &str = "article";

/// Run-level failures. Nothing is produced when one of these occurs.
#[derive(Debug, Error)]
pub enum PackageError {
    /// The URL list was rejected before any work began.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The packager configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The archive could not be encoded.
    #[error("failed to encode archive: {0}")]
    Archive(#[from] ArchiveError),

    /// The manifest could not be serialized.
    #[error("failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Which asset kinds to bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageOptions {
    /// Bundle images.
    pub download_images: bool,
    /// Bundle documents.
    pub download_files: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            download_images: true,
            download_files: true,
        }
    }
}

/// URLs to package and the asset options for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRequest {
    /// Article URLs, in archive order.
    pub urls: Vec<String>,
    /// Asset options.
    pub options: PackageOptions,
}

impl PackageRequest {
    /// Creates a request with default options.
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            options: PackageOptions::default(),
        }
    }

    /// Replaces the asset options.
    #[must_use]
    pub fn with_options(mut self, options: PackageOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of a packaging run.
#[derive(Debug, Clone)]
pub struct PackageOutput {
    /// Gzip-compressed ustar archive.
    pub archive: Vec<u8>,
    /// Summary also stored as `manifest.json` in the archive.
    pub manifest: Manifest,
}

/// Files and manifest record produced by one job.
struct JobOutcome {
    record: JobRecord,
    /// `index.md` or `error.md`.
    document: (String, Vec<u8>),
    /// Assets under paths already reserved by acquisition.
    assets: Vec<(String, Vec<u8>)>,
}

/// Packages extracted articles and their assets into one archive.
#[derive(Debug, Clone)]
pub struct Packager {
    config: PackagerConfig,
    acquirer: AssetAcquirer,
}

impl Packager {
    /// Creates a packager with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::Config`] for invalid limits and
    /// [`PackageError::Client`] if the HTTP client cannot be built.
    pub fn new(config: PackagerConfig) -> Result<Self, PackageError> {
        config.validate()?;
        let fetcher = AssetFetcher::new(&config)?;
        Ok(Self {
            config,
            acquirer: AssetAcquirer::new(fetcher),
        })
    }

    /// Creates a packager around an existing fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::Config`] for invalid limits.
    pub fn with_fetcher(config: PackagerConfig, fetcher: AssetFetcher) -> Result<Self, PackageError> {
        config.validate()?;
        Ok(Self {
            config,
            acquirer: AssetAcquirer::new(fetcher),
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PackagerConfig {
        &self.config
    }

    /// Runs one packaging pass.
    ///
    /// Extraction and asset failures are absorbed into the archive and the
    /// manifest; once validation passes an archive is always produced.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::Validation`] before any work starts if the
    /// URL list is rejected, and [`PackageError::Archive`] or
    /// [`PackageError::Manifest`] if final assembly fails.
    #[instrument(skip_all, fields(urls = request.urls.len()))]
    pub async fn package(
        &self,
        extractor: &dyn Extractor,
        request: &PackageRequest,
    ) -> Result<PackageOutput, PackageError> {
        let urls = validate_urls(&request.urls, self.config.max_urls)?;
        info!(jobs = urls.len(), "packaging started");

        let budget = ByteBudget::new(self.config.max_total_bytes);
        let options = AcquisitionOptions {
            download_images: request.options.download_images,
            download_files: request.options.download_files,
            concurrency: self.config.asset_concurrency,
        };

        let outcomes = run_bounded(&urls, self.config.job_concurrency, |index, url| {
            self.run_job(extractor, index, url, &options, &budget)
        })
        .await;

        let mut entries = EntrySet::new();
        let mut manifest = Manifest::new();
        for outcome in outcomes {
            let (path, content) = outcome.document;
            entries.add_file(&path, content);
            for (path, content) in outcome.assets {
                entries.add_reserved(&path, content)?;
            }
            manifest.record(outcome.record);
        }
        entries.add_file(MANIFEST_FILE, manifest.to_json()?);

        let encoder = self
            .config
            .modified_time
            .map_or_else(TarEncoder::with_current_time, TarEncoder::new);
        let archive = encoder.encode_gzip(entries.entries())?;

        info!(
            total = manifest.total,
            success = manifest.success,
            failed = manifest.failed,
            asset_bytes = budget.used(),
            archive_bytes = archive.len(),
            "packaging complete"
        );
        Ok(PackageOutput { archive, manifest })
    }

    async fn run_job(
        &self,
        extractor: &dyn Extractor,
        index: usize,
        url: &str,
        options: &AcquisitionOptions,
        budget: &ByteBudget,
    ) -> JobOutcome {
        let mut tracker = JobTracker::new(url);
        tracker.advance(JobState::Extracting);

        let article = match extractor.extract(url).await {
            Ok(article) => article,
            Err(error) => {
                tracker.advance(JobState::Failed);
                warn!(url = %url, state = %tracker.state(), error = %error, "extraction failed");
                let folder = folder_name(index, None, url);
                return JobOutcome {
                    document: (
                        format!("{folder}/{ERROR_FILE}"),
                        render_error(url, &error).into_bytes(),
                    ),
                    assets: Vec::new(),
                    record: JobRecord {
                        url: url.to_string(),
                        folder,
                        ok: false,
                        images: 0,
                        files: 0,
                        downloaded: 0,
                        error: Some(error.to_string()),
                    },
                };
            }
        };

        tracker.advance(JobState::AssetsPending);
        let descriptors = article.descriptors();
        let assets = self
            .acquirer
            .acquire(url, &descriptors, options, budget)
            .await;
        tracker.advance(JobState::AssetsResolved);

        let folder = folder_name(index, article.title.as_deref(), url);
        let text = rewrite_asset_links(&article.text, &assets);
        let images = descriptors
            .iter()
            .filter(|d| d.kind == AssetKind::Image)
            .count();
        let record = JobRecord {
            url: url.to_string(),
            folder: folder.clone(),
            ok: true,
            images,
            files: descriptors.len() - images,
            downloaded: assets.len(),
            error: None,
        };

        let document = (
            format!("{folder}/{INDEX_FILE}"),
            render_index(&article, url, &text).into_bytes(),
        );
        let assets = assets
            .into_iter()
            .map(|asset| (format!("{folder}/{}", asset.relative_path), asset.content))
            .collect();
        tracker.advance(JobState::EntryAssembled);

        JobOutcome {
            record,
            document,
            assets,
        }
    }
}

/// `{NNN}_{name}` with a 1-based, zero-padded input position.
///
/// The name is the sanitized title, else the sanitized host, else `article`.
#[must_use]
pub fn folder_name(index: usize, title: Option<&str>, url: &str) -> String {
    let name = title
        .map(sanitize_segment)
        .filter(|name| !name.is_empty())
        .or_else(|| {
            Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(sanitize_segment))
                .filter(|host| !host.is_empty())
        })
        .unwrap_or_else(|| FALLBACK_FOLDER_NAME.to_string());
    format!("{:03}_{name}", index + 1)
}

/// Markdown document for a successful job.
fn render_index(article: &ExtractedArticle, url: &str, text: &str) -> String {
    let title = article
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(url);

    let mut doc = format!("# {title}\n\n");
    if let Some(author) = article.author.as_deref().filter(|a| !a.trim().is_empty()) {
        doc.push_str(&format!("**Author**: {author}\n\n"));
    }
    if let Some(date) = article.date.as_deref().filter(|d| !d.trim().is_empty()) {
        doc.push_str(&format!("**Date**: {date}\n\n"));
    }
    doc.push_str(&format!("**Source**: {url}\n\n---\n\n"));
    doc.push_str(text);
    doc
}

/// Placeholder document for a failed job.
fn render_error(url: &str, error: &ExtractionError) -> String {
    format!("# Extraction failed\n\n**Source**: {url}\n\n**Error**: {error}\n")
}
