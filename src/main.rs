//! CLI entry point for the article packager.

use std::fs;
use std::io::{self, IsTerminal, Read, Write};

use anyhow::{Context, Result};
use clap::Parser;
use packager_core::{PackageOptions, PackageRequest, Packager, PackagerConfig, StaticExtractor};
use tracing::{debug, info, warn};

mod app_config;
mod cli;
mod progress;

use app_config::{FileConfig, load_default_file_config, load_explicit_file_config};
use cli::Args;
use progress::RunSpinner;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let loaded = match args.config.as_deref() {
        Some(path) => load_explicit_file_config(path)?,
        None => load_default_file_config()?,
    };
    if let Some(path) = loaded.path.as_deref() {
        debug!(path = %path.display(), found = loaded.config.is_some(), "config file resolved");
    }
    let file_config = loaded.config.unwrap_or_default();

    let config = build_config(&args, &file_config);
    let options = PackageOptions {
        download_images: !args.no_images && file_config.download_images.unwrap_or(true),
        download_files: !args.no_files && file_config.download_files.unwrap_or(true),
    };

    let raw_input = read_input(&args)?;
    let extractor = StaticExtractor::from_json(&raw_input).with_context(|| {
        format!(
            "Failed to parse extraction records from '{}'",
            args.input.display()
        )
    })?;

    let urls = if args.urls.is_empty() {
        extractor.urls().to_vec()
    } else {
        args.urls.clone()
    };
    for url in &urls {
        if !extractor.urls().iter().any(|known| known == url.trim()) {
            warn!(url = %url, "no extraction record for URL");
        }
    }

    let packager = Packager::new(config)?;
    let request = PackageRequest::new(urls).with_options(options);

    let spinner = RunSpinner::start(!args.quiet && io::stderr().is_terminal(), request.urls.len());
    debug!(spinner = spinner.is_active(), "packaging run starting");
    let result = packager.package(&extractor, &request).await;
    spinner.finish();
    let output = result?;

    fs::write(&args.output, &output.archive)
        .with_context(|| format!("Failed to write archive '{}'", args.output.display()))?;
    info!(
        path = %args.output.display(),
        bytes = output.archive.len(),
        success = output.manifest.success,
        failed = output.manifest.failed,
        "archive written"
    );

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", output.manifest.to_json()?)?;

    Ok(())
}

/// Layers file values, then CLI flags, over the library defaults.
fn build_config(args: &Args, file_config: &FileConfig) -> PackagerConfig {
    let mut config = PackagerConfig::default();
    file_config.apply_to(&mut config);
    if let Some(jobs) = args.job_concurrency {
        config.job_concurrency = usize::from(jobs);
    }
    if let Some(assets) = args.asset_concurrency {
        config.asset_concurrency = usize::from(assets);
    }
    config.modified_time = args.mtime;
    config
}

fn read_input(args: &Args) -> Result<String> {
    if args.reads_stdin() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read extraction records from stdin")?;
        return Ok(buffer);
    }
    fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file '{}'", args.input.display()))
}
