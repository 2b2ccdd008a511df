use std::time::Duration;

use log::{debug, info, warn};

use super::ProgressDisplay;
use crate::{
    aggregation::{ProgressErr, ProgressSource, Result},
    specs::MonitorSpec,
};

/// The states a `ProgressMonitor` goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Running,
    Done,
}

/// What a monitor observed by the time it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSummary {
    pub total: u64,
    pub drains: usize,
    pub state: MonitorState,
}

/// Drives a display from the deltas drained out of a `ProgressSource` until the
/// reported total reaches the target.
pub struct ProgressMonitor<S: ProgressSource> {
    source: S,
    display: Box<dyn ProgressDisplay>,
    target: u64,
    label: Option<String>,
    timeout: Option<Duration>,
    state: MonitorState,
    total: u64,
    drains: usize,
}

impl<S: ProgressSource> ProgressMonitor<S> {
    /// Creates a new `ProgressMonitor` in the running state.
    ///
    /// # Arguments
    /// * `source` - Where to drain progress from.
    /// * `display` - Where to render the drained progress.
    /// * `spec` - The target, label and wait bound of this monitor.
    ///
    /// # Returns
    /// A new `ProgressMonitor` or `ProgressErr::InvalidTarget` if the target is zero.
    pub fn new(source: S, display: Box<dyn ProgressDisplay>, spec: &MonitorSpec) -> Result<Self> {
        if spec.target == 0 {
            return Err(ProgressErr::InvalidTarget);
        }

        Ok(Self {
            source,
            display,
            target: spec.target,
            label: spec.label.clone(),
            timeout: spec.timeout(),
            state: MonitorState::Running,
            total: 0,
            drains: 0,
        })
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Drains the source once and renders the result.
    ///
    /// Once `Done` is reached the source isn't touched anymore.
    ///
    /// # Returns
    /// The state after this step, or the source's error after abandoning the display.
    pub fn step(&mut self) -> Result<MonitorState> {
        if self.state == MonitorState::Done {
            return Ok(MonitorState::Done);
        }

        let update = match self.source.next_update(self.timeout) {
            Ok(update) => update,
            Err(e) => {
                warn!(total = self.total, drains = self.drains; "progress tracking lost: {e}");
                self.display.abandon(&e.to_string());
                return Err(e);
            }
        };

        self.drains += 1;
        self.total = update.total;
        self.display.update(update.delta, update.total);
        debug!(delta = update.delta, total = update.total; "rendered progress");

        if update.total >= self.target {
            self.state = MonitorState::Done;
            self.display.close();
        }

        Ok(self.state)
    }

    /// Blocks rendering progress until the target is reached.
    ///
    /// # Returns
    /// A `MonitorSummary` once done, or the first fatal error of the source.
    pub fn run(mut self) -> Result<MonitorSummary> {
        info!(
            "monitoring {} until {} units",
            self.label.as_deref().unwrap_or("progress"),
            self.target
        );

        while self.step()? == MonitorState::Running {}

        info!(total = self.total, drains = self.drains; "target reached");
        Ok(MonitorSummary {
            total: self.total,
            drains: self.drains,
            state: self.state,
        })
    }
}
