// src/config.rs

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::MonitorError;

/// Which facility reads CPU and memory figures for the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    /// Structured OS statistics through `sysinfo`.
    #[default]
    Native,
    /// `top` in batch mode, parsed from text.
    Top,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "native" | "sysinfo" => Ok(ProviderKind::Native),
            "top" => Ok(ProviderKind::Top),
            other => Err(format!("unknown provider `{}` (expected native or top)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    // Target cadence between two samples
    pub interval: Duration,
    // Window between the two CPU readings of one sample
    pub cpu_window: Duration,
    // Upper bound for one call into the inspection facility
    pub facility_timeout: Duration,
    pub provider: ProviderKind,
    // Root of the per-process fd directories
    pub proc_root: PathBuf,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            interval: Duration::from_secs(1),
            cpu_window: Duration::from_millis(200),
            facility_timeout: Duration::from_secs(2),
            provider: ProviderKind::Native,
            proc_root: PathBuf::from("/proc"),
        }
    }
}

impl SamplerConfig {
    pub fn new(interval_secs: f64) -> Result<Self, MonitorError> {
        if !interval_secs.is_finite() || interval_secs <= 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "interval must be a positive number of seconds, got {}",
                interval_secs
            )));
        }
        Ok(SamplerConfig {
            interval: Duration::from_secs_f64(interval_secs),
            ..SamplerConfig::default()
        })
    }

    pub fn with_cpu_window(mut self, window: Duration) -> Self {
        self.cpu_window = window;
        self
    }

    pub fn with_facility_timeout(mut self, timeout: Duration) -> Self {
        self.facility_timeout = timeout;
        self
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }
}
