use std::collections::HashMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::error::SampleError;

use super::provider::ProcessMetricsProvider;
use super::types::RawReading;

const FACILITY: &str = "top";

/// Reads CPU and memory figures by running `top` in batch mode.
///
/// `top` is asked for two iterations `window` apart and only the last table
/// is used: the first iteration has no previous tick to diff against, so its
/// CPU column is either zero or a lifetime average.
pub struct TopProvider {
    program: OsString,
    window: Duration,
    timeout: Duration,
}

impl TopProvider {
    pub fn new(window: Duration, timeout: Duration) -> Self {
        TopProvider {
            program: OsString::from("top"),
            window,
            timeout,
        }
    }

    /// Runs `program` instead of the `top` found on `PATH`. It is invoked with
    /// top's batch-mode arguments.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, pid: u32) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-b")
            .args(["-n", "2"])
            .arg("-d")
            .arg(format!("{:.2}", self.window.as_secs_f64()))
            .arg("-p")
            .arg(pid.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

impl ProcessMetricsProvider for TopProvider {
    fn name(&self) -> &'static str {
        FACILITY
    }

    async fn read(&mut self, pid: u32) -> Result<RawReading, SampleError> {
        let output = match timeout(self.timeout, self.command(pid).output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) if err.kind() == ErrorKind::NotFound => {
                return Err(SampleError::FacilityUnavailable {
                    facility: FACILITY,
                    reason: err.to_string(),
                });
            }
            Ok(Err(err)) => {
                return Err(SampleError::Io {
                    facility: FACILITY,
                    source: err,
                });
            }
            Err(_) => {
                return Err(SampleError::Timeout {
                    facility: FACILITY,
                    timeout: self.timeout,
                });
            }
        };

        let text = String::from_utf8_lossy(&output.stdout);
        let fields = match parse_top_output(&text, pid) {
            Ok(fields) => fields,
            // some procps versions print nothing and fail once the pid is gone
            Err(SampleError::Parse(_)) if !output.status.success() => {
                return Err(SampleError::ProcessGone(pid));
            }
            Err(err) => return Err(err),
        };
        reading_from_fields(&fields)
    }
}

/// Maps the column names of the last process table in `text` to the values
/// of the row below them.
pub fn parse_top_output(text: &str, pid: u32) -> Result<HashMap<String, String>, SampleError> {
    let lines: Vec<&str> = text.lines().collect();
    let header_idx = lines
        .iter()
        .rposition(|line| line.split_whitespace().next() == Some("PID"))
        .ok_or_else(|| SampleError::Parse("no process table header".to_string()))?;

    // A header with nothing below it: the process exited before top saw it.
    let row = lines[header_idx + 1..]
        .iter()
        .find(|line| !line.trim().is_empty())
        .ok_or(SampleError::ProcessGone(pid))?;

    let header: Vec<&str> = lines[header_idx].split_whitespace().collect();
    let values: Vec<&str> = row.split_whitespace().collect();

    let row_pid = values.first().and_then(|value| value.parse::<u32>().ok());
    if row_pid != Some(pid) {
        return Err(SampleError::Parse(format!(
            "expected a row for pid {}, found `{}`",
            pid,
            row.trim()
        )));
    }

    let fields: HashMap<String, String> = header
        .into_iter()
        .zip(values)
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    // a zombie still has a row, with every figure zeroed
    if fields.get("S").map(String::as_str) == Some("Z") {
        return Err(SampleError::ProcessGone(pid));
    }
    Ok(fields)
}

/// Pulls `VIRT`, `RES` and `%CPU` out of a parsed `top` row.
pub fn reading_from_fields(fields: &HashMap<String, String>) -> Result<RawReading, SampleError> {
    let field = |key: &str| {
        fields
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| SampleError::Parse(format!("missing column {}", key)))
    };

    Ok(RawReading {
        virt_kib: parse_kib(field("VIRT")?)?,
        res_kib: parse_kib(field("RES")?)?,
        cpu_percent: parse_decimal(field("%CPU")?)?,
    })
}

/// Parses a number that may use a comma as decimal separator.
pub fn parse_decimal(token: &str) -> Result<f64, SampleError> {
    token
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| SampleError::Parse(format!("`{}` is not a number", token)))
}

/// Memory columns are KiB, but top scales wide values with a unit suffix.
fn parse_kib(token: &str) -> Result<f64, SampleError> {
    let token = token.trim();
    let (number, multiplier) = match token.chars().last().map(|c| c.to_ascii_lowercase()) {
        Some('k') => (&token[..token.len() - 1], 1f64),
        Some('m') => (&token[..token.len() - 1], 1024f64),
        Some('g') => (&token[..token.len() - 1], 1024f64 * 1024f64),
        Some('t') => (&token[..token.len() - 1], 1024f64 * 1024f64 * 1024f64),
        Some('p') => (&token[..token.len() - 1], 1024f64 * 1024f64 * 1024f64 * 1024f64),
        _ => (token, 1f64),
    };
    Ok(parse_decimal(number)? * multiplier)
}
