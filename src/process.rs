use std::ffi::OsStr;
use std::io;
use std::process::{ExitStatus, Stdio};

use libc::{kill as libc_kill, pid_t, ESRCH, SIGTERM};
use log::warn;
use tokio::process::{Child, Command};

use crate::error::MonitorError;

/// What the scheduler needs to know about the monitored process.
pub trait MonitoredProcess {
    fn pid(&self) -> u32;

    /// Single non-blocking liveness poll.
    fn is_running(&mut self) -> bool;
}

/// A launched child process, owned by whoever monitors it.
pub struct ProcessHandle {
    child: Child,
    pid: u32,
    exit_status: Option<ExitStatus>,
}

impl ProcessHandle {
    pub fn launch<S: AsRef<OsStr>>(program: &str, args: &[S]) -> Result<Self, MonitorError> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .spawn()
            .map_err(|source| MonitorError::Launch {
                program: program.to_string(),
                source,
            })?;

        // id() is only None once the child has been reaped
        let pid = child.id().ok_or_else(|| MonitorError::Launch {
            program: program.to_string(),
            source: io::Error::new(io::ErrorKind::Other, "child exited before its pid was read"),
        })?;

        Ok(ProcessHandle {
            child,
            pid,
            exit_status: None,
        })
    }

    pub fn exit_status(&self) -> Option<i32> {
        self.exit_status.and_then(|status| status.code())
    }

    pub fn has_exited(&self) -> bool {
        self.exit_status.is_some()
    }

    /// Sends SIGTERM without waiting. A process that already exited counts
    /// as terminated.
    pub fn terminate(&mut self) -> io::Result<()> {
        // once reaped the pid may belong to someone else
        if self.exit_status.is_some() {
            return Ok(());
        }

        let result = unsafe { libc_kill(self.pid as pid_t, SIGTERM) };
        if result == 0 {
            return Ok(());
        }

        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(ESRCH) {
            Ok(())
        } else {
            Err(err)
        }
    }

    /// SIGKILL, then reap.
    pub async fn kill(&mut self) -> io::Result<ExitStatus> {
        if let Some(status) = self.exit_status {
            return Ok(status);
        }
        self.child.kill().await?;
        self.wait().await
    }

    /// Reaps the process, blocking until it exits.
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        if let Some(status) = self.exit_status {
            return Ok(status);
        }
        let status = self.child.wait().await?;
        self.exit_status = Some(status);
        Ok(status)
    }

    /// Folds one `try_wait` result into the handle. A failed poll is treated
    /// as still running for this tick.
    fn record_poll(&mut self, poll: io::Result<Option<ExitStatus>>) -> bool {
        match poll {
            Ok(Some(status)) => {
                self.exit_status = Some(status);
                false
            }
            Ok(None) => true,
            Err(err) => {
                warn!("liveness poll for pid {} failed: {}", self.pid, err);
                true
            }
        }
    }
}

impl MonitoredProcess for ProcessHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn is_running(&mut self) -> bool {
        if self.exit_status.is_some() {
            return false;
        }
        let poll = self.child.try_wait();
        self.record_poll(poll)
    }
}
