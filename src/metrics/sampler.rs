use std::path::PathBuf;

use chrono::Local;
use log::debug;

use crate::error::SampleError;

use super::fd::count_open_fds;
use super::provider::ProcessMetricsProvider;
use super::types::Sample;

/// Produces one normalized [`Sample`] per call.
///
/// CPU and memory come from the provider; the descriptor count is read
/// separately from the proc tree. The two paths fail independently: a
/// missing fd directory yields a count of 0, while a provider failure fails
/// the whole sample.
pub struct MetricSampler<P> {
    provider: P,
    logical_cores: usize,
    proc_root: PathBuf,
}

impl<P: ProcessMetricsProvider> MetricSampler<P> {
    pub fn new(provider: P) -> Self {
        MetricSampler {
            provider,
            logical_cores: num_cpus::get().max(1),
            proc_root: PathBuf::from("/proc"),
        }
    }

    pub fn with_logical_cores(mut self, cores: usize) -> Self {
        self.logical_cores = cores.max(1);
        self
    }

    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    pub fn logical_cores(&self) -> usize {
        self.logical_cores
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub async fn sample(&mut self, pid: u32) -> Result<Sample, SampleError> {
        let timestamp = Local::now();
        let usage = self.provider.read(pid).await?.normalize(self.logical_cores);

        let fd_count = match count_open_fds(&self.proc_root, pid) {
            Ok(count) => count,
            Err(err) => {
                debug!("fd listing for pid {} unavailable: {}", pid, err);
                0
            }
        };

        Ok(Sample::new(timestamp, usage, fd_count))
    }
}
