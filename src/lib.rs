mod config;
mod error;
pub mod metrics;
mod monitor;
mod process;
mod scheduler;
mod sink;

pub use config::{ProviderKind, SamplerConfig};
pub use error::{MonitorError, SampleError};
pub use monitor::{monitor, MonitorOptions, MonitorReport};
pub use process::{MonitoredProcess, ProcessHandle};
pub use scheduler::{RunSummary, SampleScheduler, SchedulerState};
pub use sink::{log_file_name, SampleSink, TsvLogSink, FIELD_DELIMITER, HEADER};
