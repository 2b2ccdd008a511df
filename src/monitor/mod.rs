mod bar;
mod display;
mod monitor;

pub use bar::BarDisplay;
pub use display::{LogDisplay, ProgressDisplay, SilentDisplay};
pub use monitor::{MonitorState, MonitorSummary, ProgressMonitor};
