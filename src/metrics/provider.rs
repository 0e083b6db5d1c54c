use crate::config::{ProviderKind, SamplerConfig};
use crate::error::SampleError;

use super::native::SysinfoProvider;
use super::top::TopProvider;
use super::types::RawReading;

/// Source of CPU and memory figures for a single process.
///
/// Implementations take the CPU reading over a short window so the figure
/// reflects current load rather than a lifetime average.
#[allow(async_fn_in_trait)]
pub trait ProcessMetricsProvider {
    fn name(&self) -> &'static str;

    async fn read(&mut self, pid: u32) -> Result<RawReading, SampleError>;
}

/// Provider picked at runtime from [`ProviderKind`].
pub enum MetricsProvider {
    Native(SysinfoProvider),
    Top(TopProvider),
}

impl MetricsProvider {
    pub fn from_config(config: &SamplerConfig) -> Self {
        match config.provider {
            ProviderKind::Native => MetricsProvider::Native(SysinfoProvider::new(config.cpu_window)),
            ProviderKind::Top => MetricsProvider::Top(TopProvider::new(
                config.cpu_window,
                config.facility_timeout,
            )),
        }
    }
}

impl ProcessMetricsProvider for MetricsProvider {
    fn name(&self) -> &'static str {
        match self {
            MetricsProvider::Native(provider) => provider.name(),
            MetricsProvider::Top(provider) => provider.name(),
        }
    }

    async fn read(&mut self, pid: u32) -> Result<RawReading, SampleError> {
        match self {
            MetricsProvider::Native(provider) => provider.read(pid).await,
            MetricsProvider::Top(provider) => provider.read(pid).await,
        }
    }
}
