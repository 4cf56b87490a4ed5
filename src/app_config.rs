//! Application configuration loading for CLI defaults.
//!
//! The file is a flat list of `key = value` lines (a TOML subset); `#`
//! starts a comment outside strings. Command-line flags override it.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use packager_core::PackagerConfig;

const APP_DIR: &str = "article-packager";
const CONFIG_FILE: &str = "config.toml";

/// File-backed defaults for the packager CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Article jobs processed concurrently.
    pub job_concurrency: Option<usize>,
    /// Concurrent asset downloads per job.
    pub asset_concurrency: Option<usize>,
    /// Hard per-asset timeout in seconds.
    pub asset_timeout_secs: Option<u64>,
    /// Per-asset byte ceiling.
    pub max_asset_bytes: Option<u64>,
    /// Cumulative byte ceiling per run.
    pub max_total_bytes: Option<u64>,
    /// Bundle images.
    pub download_images: Option<bool>,
    /// Bundle documents.
    pub download_files: Option<bool>,
}

impl FileConfig {
    /// Validates values that can be checked without the rest of the config.
    pub fn validate(&self) -> Result<()> {
        validate_concurrency("job_concurrency", self.job_concurrency)?;
        validate_concurrency("asset_concurrency", self.asset_concurrency)?;
        if let Some(secs) = self.asset_timeout_secs
            && !(1..=600).contains(&secs)
        {
            bail!("Invalid config value for `asset_timeout_secs`: {secs}. Expected range: 1..=600");
        }
        for (field, value) in [
            ("max_asset_bytes", self.max_asset_bytes),
            ("max_total_bytes", self.max_total_bytes),
        ] {
            if value == Some(0) {
                bail!("Invalid config value for `{field}`: 0. Expected a positive byte count");
            }
        }
        Ok(())
    }

    /// Overlays the file values onto `config`.
    pub fn apply_to(&self, config: &mut PackagerConfig) {
        if let Some(value) = self.job_concurrency {
            config.job_concurrency = value;
        }
        if let Some(value) = self.asset_concurrency {
            config.asset_concurrency = value;
        }
        if let Some(secs) = self.asset_timeout_secs {
            config.asset_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = self.max_asset_bytes {
            config.max_asset_bytes = value;
        }
        if let Some(value) = self.max_total_bytes {
            config.max_total_bytes = value;
        }
    }
}

fn validate_concurrency(field: &str, value: Option<usize>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=32).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=32");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/article-packager/config.toml`
/// 2. `$HOME/.config/article-packager/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(APP_DIR).join(CONFIG_FILE));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILE),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

/// Loads config from an explicit path; the file must exist.
pub fn load_explicit_file_config(path: &Path) -> Result<LoadedConfig> {
    let config = load_file_config(path)?;
    Ok(LoadedConfig {
        path: Some(path.to_path_buf()),
        config: Some(config),
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "job_concurrency" => {
                cfg.job_concurrency = Some(parse_usize(value).with_context(invalid)?);
            }
            "asset_concurrency" => {
                cfg.asset_concurrency = Some(parse_usize(value).with_context(invalid)?);
            }
            "asset_timeout_secs" => {
                cfg.asset_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "max_asset_bytes" => {
                cfg.max_asset_bytes = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "max_total_bytes" => {
                cfg.max_total_bytes = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "download_images" => {
                cfg.download_images = Some(parse_boolean(value).with_context(invalid)?);
            }
            "download_files" => {
                cfg.download_files = Some(parse_boolean(value).with_context(invalid)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim().replace('_', "");
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_usize(raw_value: &str) -> Result<usize> {
    let value = parse_integer_u64(raw_value)?;
    usize::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for usize"))
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}
