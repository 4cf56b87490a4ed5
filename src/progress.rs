//! Progress UI (spinner) for packaging runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown on stderr while a run is in flight.
///
/// Disabled spinners are no-ops so callers need not branch.
pub(crate) struct RunSpinner {
    bar: Option<ProgressBar>,
}

impl RunSpinner {
    /// Starts a spinner for `total` articles when `enabled`.
    pub(crate) fn start(enabled: bool, total: usize) -> Self {
        if !enabled {
            return Self { bar: None };
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!(
            "Packaging {total} article{}...",
            if total == 1 { "" } else { "s" }
        ));
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    /// True when a spinner is drawing.
    pub(crate) fn is_active(&self) -> bool {
        self.bar.is_some()
    }

    /// Clears the spinner line.
    pub(crate) fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
