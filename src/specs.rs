use std::{num::NonZeroUsize, time::Duration};

use serde::{Deserialize, Serialize};

use crate::aggregation::{ProgressErr, Result};

/// The specification for a `ProgressMonitor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSpec {
    pub target: u64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl MonitorSpec {
    /// Creates a new `MonitorSpec` without label nor timeout.
    ///
    /// # Arguments
    /// * `target` - The amount of units that completes the job.
    pub fn new(target: u64) -> Self {
        Self {
            target,
            label: None,
            timeout_ms: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Bounds each wait by `timeout`, rounded up to the next millisecond and
    /// capped at `u64::MAX` milliseconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    /// The bound for each wait on the aggregator, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// The specification for the simulated workers of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSpec {
    pub workers: NonZeroUsize,
    pub units_per_worker: u64,
    /// Upper bound for the units a worker reports at once.
    #[serde(default = "default_max_batch")]
    pub max_batch: u64,
    /// Upper bound for the simulated time spent on a batch.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_batch() -> u64 {
    1
}

fn default_max_delay_ms() -> u64 {
    50
}

impl WorkerSpec {
    /// The amount of units all workers will report together.
    ///
    /// # Returns
    /// The total or `None` if it doesn't fit in a `u64`.
    pub fn total_units(&self) -> Option<u64> {
        u64::try_from(self.workers.get())
            .ok()?
            .checked_mul(self.units_per_worker)
    }
}

/// The kind of display the monitor renders to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplaySpec {
    #[default]
    Bar,
    Log,
    Silent,
}

/// A whole tracked job: its workers, its monitor and how to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub worker: WorkerSpec,
    pub monitor: MonitorSpec,
    #[serde(default)]
    pub display: DisplaySpec,
}

const DEFAULT_WORKERS: usize = 6;
const DEFAULT_UNITS_PER_WORKER: u64 = 20;

impl Default for JobSpec {
    fn default() -> Self {
        let worker = WorkerSpec {
            workers: NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN),
            units_per_worker: DEFAULT_UNITS_PER_WORKER,
            max_batch: 3,
            max_delay_ms: default_max_delay_ms(),
            seed: None,
        };

        Self {
            monitor: MonitorSpec::new(DEFAULT_WORKERS as u64 * DEFAULT_UNITS_PER_WORKER)
                .with_label("workers"),
            worker,
            display: DisplaySpec::default(),
        }
    }
}

impl JobSpec {
    /// Parses and validates a `JobSpec` from its json representation.
    ///
    /// # Arguments
    /// * `json` - The serialized spec.
    ///
    /// # Returns
    /// The spec or a `ProgressErr::Config` describing what's wrong with it.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: Self =
            serde_json::from_str(json).map_err(|e| ProgressErr::Config(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Checks the spec can actually complete.
    ///
    /// # Returns
    /// A `ProgressErr` if the target is zero, a wait would time out right
    /// away, workers can't report, or the workers will never reach the target.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.target == 0 {
            return Err(ProgressErr::InvalidTarget);
        }

        if self.monitor.timeout_ms == Some(0) {
            return Err(ProgressErr::Config("timeout_ms must be greater than zero".into()));
        }

        if self.worker.max_batch == 0 {
            return Err(ProgressErr::Config("max_batch must be greater than zero".into()));
        }

        let units = self.worker.total_units().ok_or_else(|| {
            ProgressErr::Config(format!(
                "{} workers of {} units each overflow the unit counter",
                self.worker.workers, self.worker.units_per_worker
            ))
        })?;
        if units < self.monitor.target {
            return Err(ProgressErr::Config(format!(
                "workers report {units} units but the target is {}",
                self.monitor.target
            )));
        }

        Ok(())
    }
}
