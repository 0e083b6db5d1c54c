use std::time::Duration;

use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, System};
use tokio::time::sleep;

use crate::error::SampleError;

use super::provider::ProcessMetricsProvider;
use super::types::RawReading;

const FACILITY: &str = "sysinfo::process";

/// Reads CPU and memory figures from the OS process tables via `sysinfo`.
pub struct SysinfoProvider {
    system: System,
    window: Duration,
}

impl SysinfoProvider {
    pub fn new(window: Duration) -> Self {
        SysinfoProvider {
            system: System::new(),
            // sysinfo needs this much time between refreshes for a usable CPU figure
            window: window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }

    fn refresh(&mut self, pid: Pid) -> bool {
        let kind = ProcessRefreshKind::new().with_cpu().with_memory();
        self.system.refresh_process_specifics(pid, kind)
    }
}

impl ProcessMetricsProvider for SysinfoProvider {
    fn name(&self) -> &'static str {
        FACILITY
    }

    async fn read(&mut self, pid: u32) -> Result<RawReading, SampleError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SampleError::FacilityUnavailable {
                facility: FACILITY,
                reason: format!("{} is not supported by sysinfo", std::env::consts::OS),
            });
        }

        let target = Pid::from_u32(pid);
        if !self.refresh(target) {
            return Err(SampleError::ProcessGone(pid));
        }
        sleep(self.window).await;
        if !self.refresh(target) {
            return Err(SampleError::ProcessGone(pid));
        }

        let process = self
            .system
            .process(target)
            .ok_or(SampleError::ProcessGone(pid))?;
        // exited but not yet reaped
        if process.status() == ProcessStatus::Zombie {
            return Err(SampleError::ProcessGone(pid));
        }

        Ok(RawReading {
            virt_kib: process.virtual_memory() as f64 / 1024.0,
            res_kib: process.memory() as f64 / 1024.0,
            cpu_percent: process.cpu_usage() as f64,
        })
    }
}
