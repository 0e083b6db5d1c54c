use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};
use tokio::time::timeout;

use crate::config::SamplerConfig;
use crate::error::MonitorError;
use crate::metrics::{MetricSampler, MetricsProvider};
use crate::process::{MonitoredProcess, ProcessHandle};
use crate::scheduler::{RunSummary, SampleScheduler};
use crate::sink::{log_file_name, TsvLogSink};

// How long a SIGTERM'd child gets before it is killed
const REAP_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub program: String,
    pub args: Vec<String>,
    pub output_dir: PathBuf,
    pub config: SamplerConfig,
}

impl MonitorOptions {
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(log_file_name(&self.program))
    }
}

#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub log_path: PathBuf,
    pub summary: RunSummary,
    pub exit_status: Option<i32>,
}

/// Launches the program, logs its resource usage until it exits, then reaps
/// it. The log file is only touched once the launch succeeded.
pub async fn monitor(options: &MonitorOptions) -> Result<MonitorReport, MonitorError> {
    let mut process = ProcessHandle::launch(&options.program, options.args.as_slice())?;
    info!("launched `{}` as pid {}", options.program, process.pid());

    let log_path = options.log_path();
    let outcome = match TsvLogSink::open(&log_path) {
        Ok(mut sink) => {
            let provider = MetricsProvider::from_config(&options.config);
            let sampler = MetricSampler::new(provider).with_proc_root(&options.config.proc_root);
            let mut scheduler = SampleScheduler::new(&mut process, sampler, options.config.interval);
            scheduler.run(&mut sink).await
        }
        Err(err) => Err(err),
    };

    let exit_status = reap(&mut process).await;
    let summary = outcome?;
    Ok(MonitorReport {
        log_path,
        summary,
        exit_status,
    })
}

async fn reap(process: &mut ProcessHandle) -> Option<i32> {
    let pid = process.pid();
    if let Err(err) = process.terminate() {
        warn!("failed to signal pid {}: {}", pid, err);
    }

    match timeout(REAP_GRACE, process.wait()).await {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => warn!("failed to reap pid {}: {}", pid, err),
        Err(_) => {
            warn!("pid {} ignored SIGTERM for {:?}, killing", pid, REAP_GRACE);
            if let Err(err) = process.kill().await {
                warn!("failed to kill pid {}: {}", pid, err);
            }
        }
    }
    process.exit_status()
}
