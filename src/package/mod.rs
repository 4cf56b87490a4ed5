//! Packaging orchestration.
//!
//! - [`Extractor`] - Async boundary with the external article extractor
//! - [`StaticExtractor`] - Serves results extracted ahead of time (JSON input)
//! - [`Packager`] - Runs jobs, acquires assets, assembles and encodes the archive
//! - [`Manifest`] - Run summary stored as `manifest.json`
//! - [`JobState`] - Per-job lifecycle

mod extractor;
mod manifest;
mod packager;
mod state;

pub use extractor::{
    AssetUrls, ExtractedArticle, ExtractionError, ExtractionRecord, Extractor, StaticExtractor,
};
pub use manifest::{JobRecord, MANIFEST_FILE, Manifest};
pub use packager::{
    ERROR_FILE, INDEX_FILE, PackageError, PackageOptions, PackageOutput, PackageRequest, Packager,
    folder_name,
};
pub use state::JobState;
