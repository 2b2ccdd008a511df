use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex},
    time::Duration,
};

use progress_orchestration::{
    AggregatorHandle, MonitorSpec, MonitorState, ProgressAggregator, ProgressDisplay, ProgressErr,
    ProgressMonitor, SilentDisplay, Update, WorkerPool, WorkerSpec,
};
use tokio::task;

#[derive(Clone, Default)]
struct Recorder {
    deltas: Arc<Mutex<Vec<(u64, u64)>>>,
    closed: Arc<Mutex<usize>>,
}

impl ProgressDisplay for Recorder {
    fn update(&mut self, delta: u64, total: u64) {
        self.deltas.lock().unwrap().push((delta, total));
    }

    fn close(&mut self) {
        *self.closed.lock().unwrap() += 1;
    }

    fn abandon(&mut self, reason: &str) {
        panic!("display abandoned: {reason}");
    }
}

fn worker_spec(workers: usize, units_per_worker: u64) -> WorkerSpec {
    WorkerSpec {
        workers: NonZeroUsize::new(workers).unwrap(),
        units_per_worker,
        max_batch: 3,
        max_delay_ms: 5,
        seed: Some(42),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn job_reaches_target_with_worker_pool() {
    const WORKERS: usize = 6;
    const UNITS: u64 = 25;

    let aggregator = ProgressAggregator::new();
    let handle = AggregatorHandle::new(aggregator.clone());
    let display = Recorder::default();
    let spec = MonitorSpec::new(WORKERS as u64 * UNITS)
        .with_label("pool")
        .with_timeout(Duration::from_secs(10));
    let monitor = ProgressMonitor::new(aggregator.clone(), Box::new(display.clone()), &spec).unwrap();

    let mut pool = WorkerPool::new(worker_spec(WORKERS, UNITS));
    pool.spawn_all(&handle);

    let summary = task::spawn_blocking(move || monitor.run())
        .await
        .unwrap()
        .unwrap();
    let reported = pool.join().await.unwrap();

    assert_eq!(summary.state, MonitorState::Done);
    assert_eq!(summary.total, 150);
    assert_eq!(reported.iter().sum::<u64>(), 150);

    let deltas = display.deltas.lock().unwrap().clone();
    assert_eq!(deltas.len(), summary.drains);
    assert_eq!(deltas.iter().map(|(delta, _)| delta).sum::<u64>(), 150);
    assert!(deltas.windows(2).all(|w| w[0].1 < w[1].1));
    assert_eq!(*display.closed.lock().unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn excess_progress_is_banked() {
    let aggregator = ProgressAggregator::new();
    let handle = AggregatorHandle::new(aggregator.clone());
    let monitor = ProgressMonitor::new(
        aggregator.clone(),
        Box::new(SilentDisplay),
        &MonitorSpec::new(10),
    )
    .unwrap();

    let mut pool = WorkerPool::new(worker_spec(3, 5));
    pool.spawn_all(&handle);

    let summary = task::spawn_blocking(move || monitor.run())
        .await
        .unwrap()
        .unwrap();
    pool.join().await.unwrap();

    assert!(summary.total >= 10);
    assert_eq!(aggregator.current_total(), Ok(15));
    assert_eq!(aggregator.pending(), 15 - summary.total);
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_ends_monitoring() {
    let aggregator = ProgressAggregator::new();
    let monitor = ProgressMonitor::new(
        aggregator.clone(),
        Box::new(SilentDisplay),
        &MonitorSpec::new(100),
    )
    .unwrap();

    aggregator.report(10);
    let monitor_task = task::spawn_blocking(move || monitor.run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    aggregator.shutdown();

    let res = monitor_task.await.unwrap();
    assert_eq!(res, Err(ProgressErr::Disconnected));
}

#[tokio::test(flavor = "multi_thread")]
async fn handle_coalesces_reports_before_drain() {
    let handle = AggregatorHandle::new(ProgressAggregator::new());

    handle.report(3);
    handle.report(2);

    let update = handle.await_update(None).await.unwrap();
    assert_eq!(update, Update { delta: 5, total: 5 });

    let res = handle.await_update(Some(Duration::from_millis(20))).await;
    assert!(matches!(res, Err(ProgressErr::Timeout { .. })));
    assert_eq!(handle.current_total(), Ok(5));
}
