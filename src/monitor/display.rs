use log::{info, warn};

/// Renders the progress drained by a `ProgressMonitor`.
///
/// The monitor calls `update` once per drain in drain order, then exactly one
/// of `close` (target reached) or `abandon` (the source failed).
pub trait ProgressDisplay: Send {
    fn update(&mut self, delta: u64, total: u64);
    fn close(&mut self);
    fn abandon(&mut self, reason: &str);
}

/// No-op display for tests and non-interactive use.
#[derive(Debug, Default)]
pub struct SilentDisplay;

impl ProgressDisplay for SilentDisplay {
    fn update(&mut self, _delta: u64, _total: u64) {}
    fn close(&mut self) {}
    fn abandon(&mut self, _reason: &str) {}
}

/// Display that writes every drain to the log, for runs without a terminal.
#[derive(Debug)]
pub struct LogDisplay {
    label: String,
    target: u64,
}

impl LogDisplay {
    /// Creates a new `LogDisplay`.
    ///
    /// # Arguments
    /// * `target` - The amount of units that completes the job.
    /// * `label` - An optional name for the tracked job.
    ///
    /// # Returns
    /// A new `LogDisplay` instance.
    pub fn new(target: u64, label: Option<&str>) -> Self {
        Self {
            label: label.unwrap_or("progress").to_string(),
            target,
        }
    }

    fn percent(&self, total: u64) -> u64 {
        if self.target == 0 {
            return 100;
        }

        (total.saturating_mul(100) / self.target).min(100)
    }
}

impl ProgressDisplay for LogDisplay {
    fn update(&mut self, delta: u64, total: u64) {
        let percent = self.percent(total);
        info!(
            label = self.label.as_str(), delta = delta, total = total;
            "{}: {total}/{} ({percent}%)", self.label, self.target
        );
    }

    fn close(&mut self) {
        info!("{}: done", self.label);
    }

    fn abandon(&mut self, reason: &str) {
        warn!("{}: abandoned, {reason}", self.label);
    }
}
