mod aggregator;
mod error;
mod handle;
mod source;

pub use aggregator::{ProgressAggregator, Update};
pub use error::{ProgressErr, Result};
pub use handle::AggregatorHandle;
pub use source::ProgressSource;
