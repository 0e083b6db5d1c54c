mod fd;
mod native;
mod provider;
mod sampler;
mod top;
mod types;

pub use fd::count_open_fds;
pub use native::SysinfoProvider;
pub use provider::{MetricsProvider, ProcessMetricsProvider};
pub use sampler::MetricSampler;
pub use top::{parse_decimal, parse_top_output, reading_from_fields, TopProvider};
pub use types::{RawReading, ResourceUsage, Sample, TIMESTAMP_FORMAT};
