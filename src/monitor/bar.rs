use indicatif::{ProgressBar, ProgressStyle};

use super::ProgressDisplay;

const TEMPLATE: &str = "{prefix:.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} {msg}";

/// Progress display backed by an `indicatif` bar sized to the target.
pub struct BarDisplay {
    bar: ProgressBar,
}

impl BarDisplay {
    /// Creates a new `BarDisplay` drawing to stderr.
    ///
    /// # Arguments
    /// * `target` - The amount of units that completes the job.
    /// * `label` - An optional name shown in front of the bar.
    ///
    /// # Returns
    /// A new `BarDisplay` instance.
    pub fn new(target: u64, label: Option<&str>) -> Self {
        Self::with_bar(ProgressBar::new(target), label)
    }

    fn with_bar(bar: ProgressBar, label: Option<&str>) -> Self {
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }

        if let Some(label) = label {
            bar.set_prefix(label.to_string());
        }

        Self { bar }
    }
}

impl ProgressDisplay for BarDisplay {
    fn update(&mut self, delta: u64, _total: u64) {
        self.bar.inc(delta);
    }

    fn close(&mut self) {
        self.bar.finish_with_message("done");
    }

    fn abandon(&mut self, reason: &str) {
        self.bar.abandon_with_message(reason.to_string());
    }
}
