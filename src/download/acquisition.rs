//! Per-job asset acquisition and in-text link rewriting.
//!
//! [`AssetAcquirer::acquire`] filters a job's asset references, fetches the
//! survivors through a bounded pool, and places each download under
//! `assets/{images|files}/{host}/{url dirs}/{filename}` with a per-job
//! dedupe registry. [`rewrite_asset_links`] then swaps remote URLs in the
//! article text for those local paths.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use url::Url;

use super::budget::ByteBudget;
use super::client::AssetFetcher;
use super::filename::is_placeholder_image;
use super::pool::run_bounded;
use crate::config::DEFAULT_ASSET_CONCURRENCY;
use crate::paths::{
    MAX_FILENAME_CHARS, ancestor_dirs, dedupe_path, sanitize_segment, sanitize_segment_with_limit,
};

/// Root directory for assets inside a job folder.
pub const ASSETS_DIR: &str = "assets";

/// Whether an asset is an image or a downloadable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Inline image.
    Image,
    /// Linked document or archive.
    File,
}

impl AssetKind {
    /// Lowercase singular name, used in fallback filenames.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::File => "file",
        }
    }

    /// Directory under [`ASSETS_DIR`] holding this kind.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::File => "files",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One asset reference found in extracted content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Absolute URL as it appears in the text.
    pub original_url: String,
    /// Image or file.
    pub kind: AssetKind,
}

impl AssetDescriptor {
    /// Creates an image reference.
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            original_url: url.into(),
            kind: AssetKind::Image,
        }
    }

    /// Creates a file reference.
    pub fn file(url: impl Into<String>) -> Self {
        Self {
            original_url: url.into(),
            kind: AssetKind::File,
        }
    }
}

/// A successfully acquired asset, placed relative to its job folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedAsset {
    /// URL the asset was fetched from, as found in the text.
    pub original_url: String,
    /// Image or file.
    pub kind: AssetKind,
    /// Unique job-relative archive path.
    pub relative_path: String,
    /// Asset bytes.
    pub content: Vec<u8>,
    /// Served `Content-Type`, if any.
    pub content_type: Option<String>,
}

/// Caller choices for one acquisition pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionOptions {
    /// Fetch image assets.
    pub download_images: bool,
    /// Fetch file assets.
    pub download_files: bool,
    /// Concurrent fetches for this job.
    pub concurrency: usize,
}

impl Default for AcquisitionOptions {
    fn default() -> Self {
        Self {
            download_images: true,
            download_files: true,
            concurrency: DEFAULT_ASSET_CONCURRENCY,
        }
    }
}

impl AcquisitionOptions {
    fn wants(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Image => self.download_images,
            AssetKind::File => self.download_files,
        }
    }
}

/// Fetches and places the assets of one job at a time.
#[derive(Debug, Clone)]
pub struct AssetAcquirer {
    fetcher: AssetFetcher,
}

impl AssetAcquirer {
    /// Creates an acquirer around a shared fetcher.
    #[must_use]
    pub fn new(fetcher: AssetFetcher) -> Self {
        Self { fetcher }
    }

    /// Acquires the assets referenced by the article at `article_url`.
    ///
    /// Assets of opted-out kinds are never requested. Returned assets are in
    /// descriptor order with unique `relative_path`s; failed fetches are
    /// simply absent.
    #[instrument(skip(self, descriptors, options, budget), fields(article = %article_url, assets = descriptors.len()))]
    pub async fn acquire(
        &self,
        article_url: &str,
        descriptors: &[AssetDescriptor],
        options: &AcquisitionOptions,
        budget: &ByteBudget,
    ) -> Vec<DownloadedAsset> {
        let scheduled = select_assets(descriptors, options);
        if scheduled.is_empty() {
            return Vec::new();
        }

        let fetched = run_bounded(&scheduled, options.concurrency, |_, selected| {
            self.fetcher.fetch(
                selected.descriptor.original_url.as_str(),
                article_url,
                selected.descriptor.kind,
                budget,
            )
        })
        .await;

        let placed: Vec<_> = scheduled
            .iter()
            .zip(fetched)
            .filter_map(|(selected, fetched)| {
                let fetched = fetched?;
                let path = build_relative_asset_path(
                    &selected.url,
                    selected.descriptor.kind,
                    &fetched.filename,
                );
                Some((selected, fetched, path))
            })
            .collect();

        let reserved = {
            let paths: Vec<&str> = placed.iter().map(|(_, _, path)| path.as_str()).collect();
            reserve_asset_paths(&paths)
        };
        let assets: Vec<DownloadedAsset> = placed
            .into_iter()
            .zip(reserved)
            .map(|((selected, fetched, _), relative_path)| DownloadedAsset {
                original_url: selected.descriptor.original_url.clone(),
                kind: selected.descriptor.kind,
                relative_path,
                content: fetched.content,
                content_type: fetched.content_type,
            })
            .collect();

        info!(
            scheduled = scheduled.len(),
            downloaded = assets.len(),
            "assets acquired"
        );
        assets
    }
}

/// Assigns each candidate path a unique file path within one job.
///
/// Every directory implied by any candidate is reserved up front, so a file
/// whose path is another asset's directory (`docs` next to `docs/x.pdf`)
/// is suffixed like any other collision. Directories are never renamed.
pub(crate) fn reserve_asset_paths(paths: &[&str]) -> Vec<String> {
    let mut used: HashSet<String> = paths
        .iter()
        .flat_map(|path| ancestor_dirs(path))
        .map(str::to_string)
        .collect();
    paths
        .iter()
        .map(|path| dedupe_path(path, &mut used))
        .collect()
}

/// A descriptor that passed filtering, with its parsed URL.
#[derive(Debug, Clone)]
pub(crate) struct SelectedAsset {
    pub(crate) descriptor: AssetDescriptor,
    pub(crate) url: Url,
}

/// Drops opted-out kinds, `data:` and non-web URLs, placeholder images and
/// repeated URLs (first occurrence wins).
pub(crate) fn select_assets(
    descriptors: &[AssetDescriptor],
    options: &AcquisitionOptions,
) -> Vec<SelectedAsset> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    for descriptor in descriptors {
        let raw = descriptor.original_url.trim();
        if !options.wants(descriptor.kind) {
            debug!(url = %raw, kind = %descriptor.kind, "asset kind disabled");
            continue;
        }
        if raw.is_empty() || raw.starts_with("data:") {
            continue;
        }
        let Ok(url) = Url::parse(raw) else {
            debug!(url = %raw, "unparseable asset URL");
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            debug!(url = %raw, scheme = url.scheme(), "non-web asset URL");
            continue;
        }
        if descriptor.kind == AssetKind::Image && is_placeholder_image(raw) {
            debug!(url = %raw, "placeholder image");
            continue;
        }
        if !seen.insert(raw.to_string()) {
            continue;
        }
        selected.push(SelectedAsset {
            descriptor: AssetDescriptor {
                original_url: raw.to_string(),
                kind: descriptor.kind,
            },
            url,
        });
    }
    selected
}

/// Builds `assets/{images|files}/{host}/{url dirs}/{filename}`.
///
/// Every segment is sanitized; the host falls back to `unknown-host`.
#[must_use]
pub fn build_relative_asset_path(url: &Url, kind: AssetKind, filename: &str) -> String {
    let host = url
        .host_str()
        .map(sanitize_segment)
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| "unknown-host".to_string());

    let mut segments = vec![ASSETS_DIR.to_string(), kind.dir_name().to_string(), host];

    if let Some(path_segments) = url.path_segments() {
        let dirs: Vec<&str> = path_segments.collect();
        let dirs = dirs.split_last().map_or(&[][..], |(_, dirs)| dirs);
        for dir in dirs {
            let decoded = urlencoding::decode(dir).map_or_else(|_| (*dir).to_string(), |d| d.into_owned());
            let safe = sanitize_segment(&decoded);
            if !safe.is_empty() {
                segments.push(safe);
            }
        }
    }

    let name = sanitize_segment_with_limit(filename, MAX_FILENAME_CHARS);
    segments.push(if name.is_empty() {
        format!("{}_asset", kind.as_str())
    } else {
        name
    });
    segments.join("/")
}

/// Replaces each asset's `original_url` in `text` with its `relative_path`.
///
/// Plain substring replacement, longest URL first, so a URL that prefixes
/// another cannot clobber it. URLs of assets not in `assets` stay as they are.
#[must_use]
pub fn rewrite_asset_links(text: &str, assets: &[DownloadedAsset]) -> String {
    let mut ordered: Vec<&DownloadedAsset> = assets.iter().collect();
    ordered.sort_by(|a, b| b.original_url.len().cmp(&a.original_url.len()));

    let mut rewritten = text.to_string();
    for asset in ordered {
        if asset.original_url.is_empty() {
            continue;
        }
        rewritten = rewritten.replace(&asset.original_url, &asset.relative_path);
    }
    rewritten
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn downloaded(url: &str, path: &str) -> DownloadedAsset {
        DownloadedAsset {
            original_url: url.to_string(),
            kind: AssetKind::Image,
            relative_path: path.to_string(),
            content: b"x".to_vec(),
            content_type: None,
        }
    }

    #[test]
    fn test_reserve_asset_paths_avoids_file_directory_clashes() {
        let reserved = reserve_asset_paths(&[
            "assets/files/h/docs",
            "assets/files/h/docs/x.pdf",
            "assets/files/h/docs/x.pdf",
        ]);
        assert_eq!(
            reserved,
            vec![
                "assets/files/h/docs_2",
                "assets/files/h/docs/x.pdf",
                "assets/files/h/docs/x_2.pdf",
            ]
        );

        // Directory seen before the file that shadows it
        let reserved = reserve_asset_paths(&["assets/files/h/docs/x.pdf", "assets/files/h/docs"]);
        assert_eq!(reserved, vec!["assets/files/h/docs/x.pdf", "assets/files/h/docs_2"]);
    }

    #[test]
    fn test_reserve_asset_paths_skips_suffix_taken_by_directory() {
        let reserved = reserve_asset_paths(&[
            "assets/files/h/docs",
            "assets/files/h/docs/a.pdf",
            "assets/files/h/docs_2/b.pdf",
        ]);
        assert_eq!(reserved[0], "assets/files/h/docs_3");
    }

    #[test]
    fn test_build_relative_asset_path_mirrors_source_tree() {
        let url = Url::parse("https://cdn.example.com/media/2024/05/photo.png").unwrap();
        assert_eq!(
            build_relative_asset_path(&url, AssetKind::Image, "photo.png"),
            "assets/images/cdn.example.com/media/2024/05/photo.png"
        );
    }

    #[test]
    fn test_build_relative_asset_path_sanitizes_segments() {
        let url = Url::parse("https://example.com/a%3Ab/my%20docs/x.pdf").unwrap();
        assert_eq!(
            build_relative_asset_path(&url, AssetKind::File, "x.pdf"),
            "assets/files/example.com/a_b/my docs/x.pdf"
        );
    }

    #[test]
    fn test_build_relative_asset_path_for_root_file() {
        let url = Url::parse("https://example.com/logo.svg").unwrap();
        assert_eq!(
            build_relative_asset_path(&url, AssetKind::Image, "logo.svg"),
            "assets/images/example.com/logo.svg"
        );
    }

    #[test]
    fn test_select_assets_honors_kind_options() {
        let descriptors = vec![
            AssetDescriptor::image("https://e.com/a.png"),
            AssetDescriptor::file("https://e.com/a.pdf"),
        ];
        let options = AcquisitionOptions {
            download_files: false,
            ..AcquisitionOptions::default()
        };
        let selected = select_assets(&descriptors, &options);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].descriptor.kind, AssetKind::Image);

        let none = AcquisitionOptions {
            download_images: false,
            download_files: false,
            ..AcquisitionOptions::default()
        };
        assert!(select_assets(&descriptors, &none).is_empty());
    }

    #[test]
    fn test_select_assets_drops_unusable_urls() {
        let descriptors = vec![
            AssetDescriptor::image("data:image/png;base64,AAAA"),
            AssetDescriptor::image("ftp://e.com/a.png"),
            AssetDescriptor::image("relative/path.png"),
            AssetDescriptor::image("https://e.com/img/lazy_placeholder.png"),
            AssetDescriptor::image("https://e.com/keep.png"),
            AssetDescriptor::image("  https://e.com/keep.png  "),
            AssetDescriptor::file("https://e.com/keep.png"),
        ];
        let selected = select_assets(&descriptors, &AcquisitionOptions::default());
        let urls: Vec<&str> = selected
            .iter()
            .map(|s| s.descriptor.original_url.as_str())
            .collect();
        assert_eq!(urls, vec!["https://e.com/keep.png"]);
    }

    #[test]
    fn test_rewrite_replaces_every_occurrence() {
        let text = "![a](https://e.com/a.png) and again https://e.com/a.png";
        let out = rewrite_asset_links(text, &[downloaded("https://e.com/a.png", "assets/images/e.com/a.png")]);
        assert_eq!(
            out,
            "![a](assets/images/e.com/a.png) and again assets/images/e.com/a.png"
        );
    }

    #[test]
    fn test_rewrite_handles_prefix_urls_longest_first() {
        let text = "https://e.com/a.png https://e.com/a.png?w=2";
        let assets = [
            downloaded("https://e.com/a.png", "assets/images/e.com/a.png"),
            downloaded("https://e.com/a.png?w=2", "assets/images/e.com/a_1234abcd.png"),
        ];
        assert_eq!(
            rewrite_asset_links(text, &assets),
            "assets/images/e.com/a.png assets/images/e.com/a_1234abcd.png"
        );
    }

    #[test]
    fn test_rewrite_leaves_unknown_urls_and_special_chars() {
        let text = "see https://e.com/missing.png and https://e.com/$1(a).png";
        let assets = [downloaded("https://e.com/$1(a).png", "assets/images/e.com/$1(a).png")];
        assert_eq!(
            rewrite_asset_links(text, &assets),
            "see https://e.com/missing.png and assets/images/e.com/$1(a).png"
        );
    }

    #[test]
    fn test_asset_kind_names() {
        assert_eq!(AssetKind::Image.dir_name(), "images");
        assert_eq!(AssetKind::File.dir_name(), "files");
        assert_eq!(AssetKind::File.to_string(), "file");
    }
}
