use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use log::{debug, trace};
use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

use super::{ProgressErr, Result};

/// The outcome of a single drain: the units reported since the previous drain
/// and the running total at the moment of draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update {
    pub delta: u64,
    pub total: u64,
}

#[derive(Debug, Default)]
struct State {
    total: u64,
    pending: u64,
    signaled: bool,
    closed: bool,
}

impl State {
    /// Takes the pending delta and clears the wake condition.
    fn drain(&mut self) -> Update {
        let delta = std::mem::take(&mut self.pending);
        self.signaled = false;

        Update {
            delta,
            total: self.total,
        }
    }
}

/// Collects completion counts from any number of concurrent workers and hands
/// them, coalesced, to a single consumer.
///
/// Cloning is cheap and every clone addresses the same counters, so a clone is
/// what gets handed to each worker.
///
/// Blocking consumers park on `wakeup`, async consumers on `notify`. Every
/// report signals both.
#[derive(Debug, Clone, Default)]
pub struct ProgressAggregator {
    state: Arc<Mutex<State>>,
    wakeup: Arc<Condvar>,
    notify: Arc<Notify>,
}

impl ProgressAggregator {
    /// Creates a new `ProgressAggregator` with no progress reported.
    ///
    /// # Returns
    /// A new `ProgressAggregator` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `n` completed units to the running total and the pending delta,
    /// waking the consumer if it's parked.
    ///
    /// Reporting zero units is a no-op. Reports reaching an aggregator that
    /// was already shut down are dropped.
    ///
    /// # Arguments
    /// * `n` - The amount of units completed since this worker's last report.
    pub fn report(&self, n: u64) {
        if n == 0 {
            trace!("ignoring empty progress report");
            return;
        }

        let mut state = self.state.lock();
        if state.closed {
            debug!(amount = n; "dropping progress report, aggregator is shut down");
            return;
        }

        state.total = state.total.saturating_add(n);
        state.pending = state.pending.saturating_add(n);
        state.signaled = true;
        let total = state.total;
        drop(state);

        self.wakeup.notify_one();
        self.notify.notify_one();
        trace!(amount = n, total = total; "progress reported");
    }

    /// Blocks until at least one report arrived since the previous drain, then
    /// drains the pending delta.
    ///
    /// Only a single consumer may wait at a time.
    ///
    /// # Returns
    /// The drained `Update` or `ProgressErr::Disconnected` if the aggregator
    /// was shut down.
    pub fn await_update(&self) -> Result<Update> {
        self.wait_and_drain(None)
    }

    /// Same as `await_update` but gives up after `timeout` without progress.
    ///
    /// # Arguments
    /// * `timeout` - The maximum time to stay parked.
    ///
    /// # Returns
    /// The drained `Update`, `ProgressErr::Timeout` if nothing was reported in
    /// time or `ProgressErr::Disconnected` if the aggregator was shut down.
    pub fn await_update_timeout(&self, timeout: Duration) -> Result<Update> {
        self.wait_and_drain(Some(timeout))
    }

    /// Reads the running total without blocking on new progress.
    ///
    /// # Returns
    /// The total or `ProgressErr::Disconnected` if the aggregator was shut down.
    pub fn current_total(&self) -> Result<u64> {
        let state = self.state.lock();
        if state.closed {
            return Err(ProgressErr::Disconnected);
        }

        Ok(state.total)
    }

    /// Returns the amount of units reported but not yet drained.
    pub fn pending(&self) -> u64 {
        self.state.lock().pending
    }

    /// Marks the aggregator as gone and releases a parked consumer, which will
    /// then fail with `ProgressErr::Disconnected`.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }

        state.closed = true;
        let (total, pending) = (state.total, state.pending);
        drop(state);

        self.wakeup.notify_all();
        self.notify.notify_one();
        debug!(total = total, pending = pending; "aggregator shut down");
    }

    /// Drains the pending delta if any report arrived since the previous drain,
    /// without ever blocking.
    ///
    /// # Returns
    /// `None` if there's nothing to drain yet, otherwise the drained `Update`
    /// or `ProgressErr::Disconnected` if the aggregator was shut down.
    pub(super) fn try_drain(&self) -> Option<Result<Update>> {
        Self::drain_signaled(&mut self.state.lock())
    }

    /// Resolves once a report or a shutdown happened after the last time this
    /// was awaited. A report landing before the await leaves a permit behind.
    pub(super) async fn notified(&self) {
        self.notify.notified().await;
    }

    fn drain_signaled(state: &mut State) -> Option<Result<Update>> {
        if state.closed {
            return Some(Err(ProgressErr::Disconnected));
        }

        if !state.signaled {
            return None;
        }

        let update = state.drain();
        debug!(delta = update.delta, total = update.total; "drained progress");
        Some(Ok(update))
    }

    /// The wake check and the drain happen under the same guard, a report
    /// landing between them is impossible.
    fn wait_and_drain(&self, timeout: Option<Duration>) -> Result<Update> {
        // A deadline too far away to represent is the same as no deadline.
        let deadline = timeout
            .and_then(|waited| Instant::now().checked_add(waited).map(|at| (at, waited)));
        let mut state = self.state.lock();

        loop {
            if let Some(res) = Self::drain_signaled(&mut state) {
                return res;
            }

            match deadline {
                Some((deadline, waited)) => {
                    let timed_out = self.wakeup.wait_until(&mut state, deadline).timed_out();
                    if timed_out && !state.signaled && !state.closed {
                        return Err(ProgressErr::Timeout { waited });
                    }
                }
                None => self.wakeup.wait(&mut state),
            }
        }
    }
}
