//! Asset download engine: fetching, budgets, bounded pools and placement.
//!
//! # Features
//!
//! - One GET per asset with a hard timeout, browser-like headers and a
//!   `Referer` set to the originating article
//! - Per-asset and run-wide byte ceilings, the latter shared atomically by
//!   every concurrent fetch of a run
//! - Filename resolution from `Content-Disposition`, the URL, or a hash
//! - Bounded worker pool over a shared cursor, results in input order
//! - Local placement mirroring the source site's directory shape, and
//!   in-text link rewriting
//!
//! Failures are never retried: a failed asset is omitted and its remote URL
//! stays in the text.

mod acquisition;
mod budget;
mod client;
mod constants;
mod error;
mod filename;
mod pool;

pub use acquisition::{
    ASSETS_DIR, AcquisitionOptions, AssetAcquirer, AssetDescriptor, AssetKind, DownloadedAsset,
    build_relative_asset_path, rewrite_asset_links,
};
pub use budget::ByteBudget;
pub use client::{AssetFetcher, FetchedAsset};
pub use error::AssetError;
pub use filename::{is_placeholder_image, resolve_filename};
pub use pool::run_bounded;
