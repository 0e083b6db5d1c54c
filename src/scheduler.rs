use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio::time::sleep;

use crate::error::{MonitorError, SampleError};
use crate::metrics::{MetricSampler, ProcessMetricsProvider};
use crate::process::MonitoredProcess;
use crate::sink::SampleSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub samples_written: u64,
    pub ticks_skipped: u64,
}

/// Samples one process at a fixed cadence until it exits.
pub struct SampleScheduler<'a, T, P> {
    process: &'a mut T,
    sampler: MetricSampler<P>,
    interval: Duration,
    state: SchedulerState,
}

impl<'a, T, P> SampleScheduler<'a, T, P>
where
    T: MonitoredProcess,
    P: ProcessMetricsProvider,
{
    pub fn new(process: &'a mut T, sampler: MetricSampler<P>, interval: Duration) -> Self {
        SampleScheduler {
            process,
            sampler,
            interval,
            state: SchedulerState::Running,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Runs until the process is no longer running.
    ///
    /// Transient sampling failures leave a gap for that tick. A missing
    /// inspection facility or a failing sink ends the run with an error.
    pub async fn run<S: SampleSink>(&mut self, sink: &mut S) -> Result<RunSummary, MonitorError> {
        let pid = self.process.pid();
        let mut summary = RunSummary::default();
        info!(
            "sampling pid {} every {:?} via {} ({} logical cores)",
            pid,
            self.interval,
            self.sampler.provider_name(),
            self.sampler.logical_cores()
        );

        while self.state == SchedulerState::Running {
            if !self.process.is_running() {
                self.state = SchedulerState::Stopped;
                break;
            }

            let started = Instant::now();
            match self.sampler.sample(pid).await {
                Ok(sample) => {
                    debug!("pid {}: {:?}", pid, sample);
                    sink.append_record(&sample.to_record())
                        .map_err(MonitorError::Append)?;
                    summary.samples_written += 1;
                }
                Err(err) => match err.into_fatal() {
                    Ok(fatal) => {
                        self.state = SchedulerState::Stopped;
                        return Err(fatal);
                    }
                    Err(SampleError::ProcessGone(_)) => {
                        debug!("pid {} exited mid-sample, skipping tick", pid);
                        summary.ticks_skipped += 1;
                    }
                    Err(err) => {
                        warn!("skipping sample for pid {}: {}", pid, err);
                        summary.ticks_skipped += 1;
                    }
                },
            }

            let remaining = self.interval.saturating_sub(started.elapsed());
            if !remaining.is_zero() {
                sleep(remaining).await;
            }
        }

        info!(
            "pid {} stopped: {} samples written, {} ticks skipped",
            pid, summary.samples_written, summary.ticks_skipped
        );
        Ok(summary)
    }
}
