use std::{env, fs};

use anyhow::Context;
use log::{info, warn};
use tokio::{signal, task};

use progress_orchestration::{
    AggregatorHandle, BarDisplay, DisplaySpec, JobSpec, LogDisplay, ProgressAggregator,
    ProgressDisplay, ProgressMonitor, SilentDisplay, WorkerPool,
};

const SPEC_VAR: &str = "JOB_SPEC";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let spec = load_spec()?;
    info!(
        "running {} worker(s), {} unit(s) each",
        spec.worker.workers, spec.worker.units_per_worker
    );

    let aggregator = ProgressAggregator::new();
    let handle = AggregatorHandle::new(aggregator.clone());
    let monitor = ProgressMonitor::new(aggregator.clone(), build_display(&spec), &spec.monitor)?;

    let mut pool = WorkerPool::new(spec.worker);
    pool.spawn_all(&handle);

    let watchdog = {
        let aggregator = aggregator.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                warn!("received SIGINT, shutting down the aggregator");
                aggregator.shutdown();
            }
        })
    };

    let res = task::spawn_blocking(move || monitor.run())
        .await
        .context("monitor task panicked")?;
    watchdog.abort();

    let summary = match res {
        Ok(summary) => summary,
        Err(e) => {
            pool.abort();
            return Err(e).context("progress tracking ended early");
        }
    };

    let reported = pool.join().await.context("a worker failed")?;
    info!(
        "done after {} drain(s): monitor saw {} unit(s), workers reported {}",
        summary.drains,
        summary.total,
        reported.iter().sum::<u64>()
    );

    Ok(())
}

/// Reads the job spec from the file named by `JOB_SPEC`, or falls back to the default job.
fn load_spec() -> anyhow::Result<JobSpec> {
    let Ok(path) = env::var(SPEC_VAR) else {
        let spec = JobSpec::default();
        spec.validate()?;
        return Ok(spec);
    };

    let json = fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let spec = JobSpec::from_json(&json).with_context(|| format!("invalid job spec in {path}"))?;
    info!("loaded job spec from {path}");
    Ok(spec)
}

fn build_display(spec: &JobSpec) -> Box<dyn ProgressDisplay> {
    let target = spec.monitor.target;
    let label = spec.monitor.label.as_deref();

    match spec.display {
        DisplaySpec::Bar => Box::new(BarDisplay::new(target, label)),
        DisplaySpec::Log => Box::new(LogDisplay::new(target, label)),
        DisplaySpec::Silent => Box::new(SilentDisplay),
    }
}
