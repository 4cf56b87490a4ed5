//! Run summary written as `manifest.json`.

use serde::{Deserialize, Serialize};

/// Name of the manifest entry at the archive root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Outcome of one requested URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Requested URL.
    pub url: String,
    /// Top-level archive folder for the job.
    pub folder: String,
    /// Whether extraction succeeded.
    pub ok: bool,
    /// Image references found in the extracted content.
    pub images: usize,
    /// File references found in the extracted content.
    pub files: usize,
    /// Assets actually stored in the archive.
    pub downloaded: usize,
    /// Extraction error, for failed jobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run-level summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Number of requested URLs.
    pub total: usize,
    /// Jobs whose extraction succeeded.
    pub success: usize,
    /// Jobs whose extraction failed.
    pub failed: usize,
    /// Per-job records in input order.
    pub results: Vec<JobRecord>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and updates the counters.
    pub fn record(&mut self, record: JobRecord) {
        self.total += 1;
        if record.ok {
            self.success += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(record);
    }

    /// Serializes as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
