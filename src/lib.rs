//! Many-writer, single-reader progress aggregation.
//!
//! Workers report completed units to a shared [`ProgressAggregator`], a single
//! [`ProgressMonitor`] blocks on it until new progress exists and renders the
//! drained deltas through a [`ProgressDisplay`].

pub mod aggregation;
pub mod monitor;
pub mod specs;
pub mod workers;

pub use aggregation::{
    AggregatorHandle, ProgressAggregator, ProgressErr, ProgressSource, Result, Update,
};
pub use monitor::{
    BarDisplay, LogDisplay, MonitorState, MonitorSummary, ProgressDisplay, ProgressMonitor,
    SilentDisplay,
};
pub use specs::{DisplaySpec, JobSpec, MonitorSpec, WorkerSpec};
pub use workers::WorkerPool;
