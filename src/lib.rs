//! Article Packager Core Library
//!
//! Bundles already-extracted web articles, and the images and documents they
//! reference, into a single portable `.tar.gz` archive.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`paths`] - Path sanitization and archive-wide deduplication
//! - [`input`] - Run-level URL validation
//! - [`download`] - Asset fetching, byte budgets, bounded pools, link rewriting
//! - [`archive`] - From-scratch ustar encoder with a gzip pass
//! - [`package`] - Extraction jobs, manifest, and archive assembly
//! - [`config`] - Limits and defaults for a run
//!
//! # Example
//!
//! ```no_run
//! use packager_core::{PackageRequest, Packager, PackagerConfig, StaticExtractor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = StaticExtractor::from_json(r#"[{ "url": "https://example.com/", "text": "hi" }]"#)?;
//! let packager = Packager::new(PackagerConfig::default())?;
//! let output = packager
//!     .package(&extractor, &PackageRequest::new(["https://example.com/"]))
//!     .await?;
//! std::fs::write("articles.tar.gz", &output.archive)?;
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod config;
pub mod download;
pub mod input;
pub mod package;
pub mod paths;
mod user_agent;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use archive::{ArchiveEntry, ArchiveError, EntryKind, EntrySet, TarEncoder};
pub use config::{ConfigError, PackagerConfig};
pub use download::{
    AcquisitionOptions, AssetAcquirer, AssetDescriptor, AssetError, AssetFetcher, AssetKind,
    ByteBudget, DownloadedAsset,
};
pub use input::{ValidationError, validate_urls};
pub use package::{
    ExtractedArticle, ExtractionError, Extractor, Manifest, PackageError, PackageOptions,
    PackageOutput, PackageRequest, Packager, StaticExtractor,
};
