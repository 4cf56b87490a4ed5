//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Default archive path when `--output` is not given.
pub const DEFAULT_OUTPUT: &str = "articles.tar.gz";

/// Bundle extracted web articles and their assets into a `.tar.gz` archive.
///
/// Reads pre-extracted article records (JSON) and downloads every referenced
/// image and document alongside the article text.
#[derive(Parser, Debug)]
#[command(name = "article-packager")]
#[command(author, version, about)]
pub struct Args {
    /// Article URLs to package, in archive order (default: every record in the input)
    pub urls: Vec<String>,

    /// JSON file of extraction records, or `-` for stdin
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path of the archive to write
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Do not download images
    #[arg(long)]
    pub no_images: bool,

    /// Do not download documents
    #[arg(long)]
    pub no_files: bool,

    /// Article jobs processed concurrently (1-32)
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub job_concurrency: Option<u8>,

    /// Concurrent asset downloads per article (1-32)
    #[arg(short = 'a', long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub asset_concurrency: Option<u8>,

    /// Fixed modification time (Unix seconds) for every archive entry
    #[arg(long)]
    pub mtime: Option<u64>,

    /// Config file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// True when the input should be read from stdin.
    #[must_use]
    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}
