use chrono::{DateTime, Local};

/// `asctime`-style timestamp used in the log, e.g. `Sun Oct 18 09:41:07 2026`.
pub const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// CPU and memory figures as reported by a provider, before normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawReading {
    pub virt_kib: f64,
    pub res_kib: f64,
    /// Summed over cores, so it may exceed 100 on multi-core hosts.
    pub cpu_percent: f64,
}

/// Normalized figures: whole megabytes and CPU share of the whole machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceUsage {
    pub vms_mb: u64,
    pub rss_mb: u64,
    pub cpu_percent: u32,
}

impl RawReading {
    /// Converts to megabytes and divides CPU by the logical core count.
    pub fn normalize(&self, logical_cores: usize) -> ResourceUsage {
        let cores = logical_cores.max(1) as f64;
        let cpu = non_negative(self.cpu_percent) / cores;
        ResourceUsage {
            vms_mb: kib_to_mb(self.virt_kib),
            rss_mb: kib_to_mb(self.res_kib),
            cpu_percent: cpu.round().min(100.0) as u32,
        }
    }
}

fn kib_to_mb(kib: f64) -> u64 {
    (non_negative(kib) / 1024.0).round() as u64
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Local>,
    pub vms_mb: u64,
    pub rss_mb: u64,
    pub cpu_percent: u32,
    pub fd_count: usize,
}

impl Sample {
    pub fn new(timestamp: DateTime<Local>, usage: ResourceUsage, fd_count: usize) -> Self {
        Sample {
            timestamp,
            vms_mb: usage.vms_mb,
            rss_mb: usage.rss_mb,
            cpu_percent: usage.cpu_percent,
            fd_count,
        }
    }

    /// Fields in log column order: TIME, VMS, RSS, %CPU, FD.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.vms_mb.to_string(),
            self.rss_mb.to_string(),
            self.cpu_percent.to_string(),
            self.fd_count.to_string(),
        ]
    }
}
