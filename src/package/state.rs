//! Per-job lifecycle.

use std::fmt;

use tracing::{debug, warn};

/// Lifecycle of one packaging job.
///
/// `Pending → Extracting → AssetsPending → AssetsResolved → EntryAssembled`,
/// with `Failed` reachable from `Extracting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    /// Queued, not started.
    Pending,
    /// Waiting on the extractor.
    Extracting,
    /// Extraction succeeded; assets are being fetched.
    AssetsPending,
    /// Every asset fetch has finished, successfully or not.
    AssetsResolved,
    /// Archive entries for the job are built.
    EntryAssembled,
    /// Extraction failed; an error placeholder will be written.
    Failed,
}

impl JobState {
    /// Returns the lowercase name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Extracting => "extracting",
            Self::AssetsPending => "assets_pending",
            Self::AssetsResolved => "assets_resolved",
            Self::EntryAssembled => "entry_assembled",
            Self::Failed => "failed",
        }
    }

    /// Returns true if `next` directly follows `self`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Extracting)
                | (Self::Extracting, Self::AssetsPending | Self::Failed)
                | (Self::AssetsPending, Self::AssetsResolved)
                | (Self::AssetsResolved, Self::EntryAssembled)
        )
    }

    /// Returns true for `EntryAssembled` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::EntryAssembled | Self::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current state of one job, with traced transitions.
#[derive(Debug)]
pub(crate) struct JobTracker<'a> {
    url: &'a str,
    state: JobState,
}

impl<'a> JobTracker<'a> {
    pub(crate) fn new(url: &'a str) -> Self {
        Self {
            url,
            state: JobState::Pending,
        }
    }

    pub(crate) fn state(&self) -> JobState {
        self.state
    }

    /// Moves to `next`; out-of-order transitions are logged and applied.
    pub(crate) fn advance(&mut self, next: JobState) {
        if !self.state.can_advance_to(next) {
            warn!(url = %self.url, from = %self.state, to = %next, "unexpected job transition");
        }
        debug!(url = %self.url, from = %self.state, to = %next, "job state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            JobState::Pending,
            JobState::Extracting,
            JobState::AssetsPending,
            JobState::AssetsResolved,
            JobState::EntryAssembled,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(JobState::EntryAssembled.is_terminal());
    }

    #[test]
    fn test_failed_only_from_extracting() {
        assert!(JobState::Extracting.can_advance_to(JobState::Failed));
        assert!(!JobState::Pending.can_advance_to(JobState::Failed));
        assert!(!JobState::AssetsPending.can_advance_to(JobState::Failed));
        assert!(JobState::Failed.is_terminal());
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(!JobState::Pending.can_advance_to(JobState::AssetsPending));
        assert!(!JobState::AssetsPending.can_advance_to(JobState::EntryAssembled));
    }

    #[test]
    fn test_tracker_follows_transitions() {
        let mut tracker = JobTracker::new("https://example.com/a");
        assert_eq!(tracker.state(), JobState::Pending);
        tracker.advance(JobState::Extracting);
        tracker.advance(JobState::Failed);
        assert_eq!(tracker.state(), JobState::Failed);
        assert_eq!(tracker.state().to_string(), "failed");
    }
}
