use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Fatal errors. Any of these ends monitoring.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("process inspection facility `{facility}` is unavailable: {reason}")]
    FacilityUnavailable {
        facility: &'static str,
        reason: String,
    },

    #[error("log file {}: {source}", path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to append sample to log: {0}")]
    Append(#[source] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while taking a single sample.
///
/// Everything except `FacilityUnavailable` only costs the current tick.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("process {0} exited before it could be sampled")]
    ProcessGone(u32),

    #[error("unexpected inspection output: {0}")]
    Parse(String),

    #[error("{facility} did not answer within {timeout:?}")]
    Timeout {
        facility: &'static str,
        timeout: Duration,
    },

    #[error("{facility} failed: {source}")]
    Io {
        facility: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{facility} is unavailable: {reason}")]
    FacilityUnavailable {
        facility: &'static str,
        reason: String,
    },
}

impl SampleError {
    /// Escalates a fatal error to the `MonitorError` that ends the run.
    /// Transient errors come back unchanged.
    pub fn into_fatal(self) -> Result<MonitorError, SampleError> {
        match self {
            SampleError::FacilityUnavailable { facility, reason } => {
                Ok(MonitorError::FacilityUnavailable { facility, reason })
            }
            transient => Err(transient),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_sample_error_keeps_facility_name() {
        let err = SampleError::FacilityUnavailable {
            facility: "top",
            reason: "No such file or directory".into(),
        }
        .into_fatal()
        .expect("missing facility escalates");
        let message = err.to_string();
        assert!(message.contains("`top`"), "{}", message);
        assert!(message.contains("No such file"), "{}", message);
    }

    #[test]
    fn transient_errors_are_not_escalated() {
        let transient = [
            SampleError::ProcessGone(42),
            SampleError::Parse("no header".into()),
            SampleError::Timeout {
                facility: "top",
                timeout: Duration::from_secs(2),
            },
            SampleError::Io {
                facility: "top",
                source: io::Error::new(io::ErrorKind::Other, "broken pipe"),
            },
        ];
        for err in transient {
            let described = err.to_string();
            let back = err.into_fatal().expect_err("transient stays a SampleError");
            assert_eq!(back.to_string(), described);
        }
    }
}
