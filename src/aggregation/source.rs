use std::time::Duration;

use super::{ProgressAggregator, Result, Update};

/// Anything a `ProgressMonitor` can drain progress from.
///
/// This acts as the seam between the monitor and wherever the aggregator
/// actually lives, the local `ProgressAggregator` being the main implementor.
pub trait ProgressSource {
    /// Should block until new progress exists and drain it.
    ///
    /// # Arguments
    /// * `timeout` - An optional bound on how long to wait for progress.
    ///
    /// # Returns
    /// The drained `Update`, or a fatal error if the source is gone or the wait timed out.
    fn next_update(&self, timeout: Option<Duration>) -> Result<Update>;

    /// Should return a snapshot of the total without blocking on new progress.
    fn current_total(&self) -> Result<u64>;
}

impl ProgressSource for ProgressAggregator {
    fn next_update(&self, timeout: Option<Duration>) -> Result<Update> {
        match timeout {
            Some(timeout) => self.await_update_timeout(timeout),
            None => self.await_update(),
        }
    }

    fn current_total(&self) -> Result<u64> {
        ProgressAggregator::current_total(self)
    }
}
