use std::time::Duration;

use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::{
    task::{JoinError, JoinSet},
    time,
};

use crate::{aggregation::AggregatorHandle, specs::WorkerSpec};

/// A set of simulated workers, each completing its share of a job in random
/// batches and reporting every batch to the aggregator.
pub struct WorkerPool {
    tasks: JoinSet<(usize, u64)>,
    spec: WorkerSpec,
}

impl WorkerPool {
    /// Creates a new `WorkerPool` with no running workers.
    ///
    /// # Arguments
    /// * `spec` - How many workers to run and how much each one reports.
    ///
    /// # Returns
    /// A new `WorkerPool` instance.
    pub fn new(spec: WorkerSpec) -> Self {
        Self {
            tasks: JoinSet::new(),
            spec,
        }
    }

    /// Spawns every worker of the spec, each one reporting through its own handle.
    ///
    /// # Arguments
    /// * `handle` - The handle to the aggregator of this job.
    pub fn spawn_all(&mut self, handle: &AggregatorHandle) {
        for worker_id in 0..self.spec.workers.get() {
            self.spawn(worker_id, handle.clone());
        }
    }

    fn spawn(&mut self, worker_id: usize, handle: AggregatorHandle) {
        let WorkerSpec {
            units_per_worker,
            max_batch,
            max_delay_ms,
            seed,
            ..
        } = self.spec;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker_id as u64)),
            None => StdRng::from_os_rng(),
        };

        let task = async move {
            let mut remaining = units_per_worker;

            while remaining > 0 {
                let batch = rng.random_range(1..=max_batch.max(1)).min(remaining);
                let delay = rng.random_range(0..=max_delay_ms);

                time::sleep(Duration::from_millis(delay)).await;
                handle.report(batch);
                remaining -= batch;
            }

            debug!(worker_id = worker_id, units = units_per_worker; "worker finished");
            (worker_id, units_per_worker)
        };

        self.tasks.spawn(task);
    }

    /// Stops every worker still running, what they already reported stays reported.
    pub fn abort(&mut self) {
        self.tasks.abort_all();
    }

    /// Waits for every worker to finish.
    ///
    /// # Returns
    /// The units reported by each worker, indexed by worker id, or the first
    /// worker failure.
    pub async fn join(mut self) -> Result<Vec<u64>, JoinError> {
        let mut reported = vec![0; self.spec.workers.get()];

        while let Some(res) = self.tasks.join_next().await {
            let (worker_id, units) = res?;
            reported[worker_id] = units;
        }

        Ok(reported)
    }
}
