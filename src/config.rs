//! Limits and defaults for a packaging run.

use std::time::Duration;

use thiserror::Error;

/// Default number of article jobs processed concurrently.
pub const DEFAULT_JOB_CONCURRENCY: usize = 2;

/// Default number of concurrent asset downloads per job.
pub const DEFAULT_ASSET_CONCURRENCY: usize = 6;

/// Hard per-asset timeout, covering connect, headers and body.
pub const DEFAULT_ASSET_TIMEOUT: Duration = Duration::from_secs(20);

/// Connect timeout for asset requests.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest single asset accepted (25 MiB).
pub const DEFAULT_MAX_ASSET_BYTES: u64 = 25 * 1024 * 1024;

/// Largest cumulative asset payload accepted per run (150 MiB).
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 150 * 1024 * 1024;

/// Largest number of URLs accepted per run.
pub const DEFAULT_MAX_URLS: usize = 20;

const MIN_CONCURRENCY: usize = 1;
const MAX_CONCURRENCY: usize = 32;

/// Invalid packager configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A concurrency limit is out of range.
    #[error(
        "invalid {name} value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// Which limit was rejected.
        name: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// A byte budget, timeout or URL limit is zero.
    #[error("invalid {name}: must be greater than zero")]
    Zero {
        /// Which limit was rejected.
        name: &'static str,
    },

    /// The per-asset ceiling exceeds the run ceiling.
    #[error("max_asset_bytes ({asset}) must not exceed max_total_bytes ({total})")]
    AssetCeilingAboveTotal {
        /// Per-asset ceiling.
        asset: u64,
        /// Run ceiling.
        total: u64,
    },
}

/// Configuration for a [`Packager`](crate::package::Packager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerConfig {
    /// Article jobs processed concurrently.
    pub job_concurrency: usize,
    /// Asset downloads in flight per job.
    pub asset_concurrency: usize,
    /// Hard timeout for one asset download.
    pub asset_timeout: Duration,
    /// Connect timeout for asset requests.
    pub connect_timeout: Duration,
    /// Per-asset byte ceiling.
    pub max_asset_bytes: u64,
    /// Cumulative byte ceiling across every asset of a run.
    pub max_total_bytes: u64,
    /// Maximum URLs per run.
    pub max_urls: usize,
    /// Fixed modification time for archive entries; `None` uses the clock.
    pub modified_time: Option<u64>,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            job_concurrency: DEFAULT_JOB_CONCURRENCY,
            asset_concurrency: DEFAULT_ASSET_CONCURRENCY,
            asset_timeout: DEFAULT_ASSET_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_asset_bytes: DEFAULT_MAX_ASSET_BYTES,
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
            max_urls: DEFAULT_MAX_URLS,
            modified_time: None,
        }
    }
}

impl PackagerConfig {
    /// Checks every limit.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_concurrency("job_concurrency", self.job_concurrency)?;
        check_concurrency("asset_concurrency", self.asset_concurrency)?;
        if self.asset_timeout.is_zero() {
            return Err(ConfigError::Zero {
                name: "asset_timeout",
            });
        }
        if self.max_asset_bytes == 0 {
            return Err(ConfigError::Zero {
                name: "max_asset_bytes",
            });
        }
        if self.max_total_bytes == 0 {
            return Err(ConfigError::Zero {
                name: "max_total_bytes",
            });
        }
        if self.max_urls == 0 {
            return Err(ConfigError::Zero { name: "max_urls" });
        }
        if self.max_asset_bytes > self.max_total_bytes {
            return Err(ConfigError::AssetCeilingAboveTotal {
                asset: self.max_asset_bytes,
                total: self.max_total_bytes,
            });
        }
        Ok(())
    }
}

fn check_concurrency(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if (MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidConcurrency { name, value })
    }
}
