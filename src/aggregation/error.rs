use std::{error::Error, fmt, io, time::Duration};

/// The progress module's result type.
pub type Result<T> = std::result::Result<T, ProgressErr>;

/// Failures surfaced by the aggregator, its handles and the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressErr {
    /// A monitor was configured with a target of zero units.
    InvalidTarget,
    /// The aggregator was shut down or its host task died.
    Disconnected,
    /// No progress arrived within the configured wait.
    Timeout { waited: Duration },
    /// A job specification failed validation.
    Config(String),
}

impl fmt::Display for ProgressErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressErr::InvalidTarget => write!(f, "invalid target: must be greater than zero"),
            ProgressErr::Disconnected => write!(f, "progress aggregator is unreachable"),
            ProgressErr::Timeout { waited } => {
                write!(f, "no progress reported after {}ms", waited.as_millis())
            }
            ProgressErr::Config(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for ProgressErr {}

/// Boundary conversion for binaries / I/O APIs.
impl From<ProgressErr> for io::Error {
    fn from(value: ProgressErr) -> Self {
        match value {
            ProgressErr::Timeout { .. } => io::Error::new(io::ErrorKind::TimedOut, value),
            ProgressErr::Disconnected => io::Error::new(io::ErrorKind::BrokenPipe, value),
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_timed_out() {
        let err = ProgressErr::Timeout {
            waited: Duration::from_millis(250),
        };

        assert_eq!(err.to_string(), "no progress reported after 250ms");
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_disconnected_maps_to_broken_pipe() {
        let io_err: io::Error = ProgressErr::Disconnected.into();
        assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);
    }
}
