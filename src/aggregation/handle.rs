use std::{ops::Deref, time::Duration};

use tokio::time;

use super::{ProgressAggregator, ProgressErr, Result, Update};

/// The async interface to interact with a `ProgressAggregator`.
///
/// Reports go straight through `Deref`, their critical section is short. Waits
/// park the task instead of a thread, and the drain itself happens within a
/// single poll, so dropping an `await_update` future mid-wait never loses units.
#[derive(Debug, Clone)]
pub struct AggregatorHandle(ProgressAggregator);

impl Deref for AggregatorHandle {
    type Target = ProgressAggregator;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AggregatorHandle {
    /// Creates a new `AggregatorHandle`.
    ///
    /// # Arguments
    /// * `aggregator` - The underlying aggregator.
    ///
    /// # Returns
    /// A new `AggregatorHandle` instance.
    pub fn new(aggregator: ProgressAggregator) -> Self {
        Self(aggregator)
    }

    /// Async counterpart of `ProgressAggregator::await_update`.
    ///
    /// # Arguments
    /// * `timeout` - An optional bound on how long to wait for progress.
    ///
    /// # Returns
    /// The drained `Update`, `ProgressErr::Timeout` if nothing was reported in
    /// time or `ProgressErr::Disconnected` if the aggregator was shut down.
    pub async fn await_update(&self, timeout: Option<Duration>) -> Result<Update> {
        match timeout {
            Some(waited) => time::timeout(waited, self.wait_and_drain())
                .await
                .map_err(|_| ProgressErr::Timeout { waited })?,
            None => self.wait_and_drain().await,
        }
    }

    async fn wait_and_drain(&self) -> Result<Update> {
        loop {
            if let Some(res) = self.0.try_drain() {
                return res;
            }

            self.0.notified().await;
        }
    }
}

impl From<ProgressAggregator> for AggregatorHandle {
    fn from(value: ProgressAggregator) -> Self {
        Self::new(value)
    }
}
