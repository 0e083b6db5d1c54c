use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, LineWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::MonitorError;

pub const FIELD_DELIMITER: &str = "\t";
pub const HEADER: [&str; 5] = ["TIME", "VMS", "RSS", "%CPU", "FD"];

/// Receives records in the order they are produced.
pub trait SampleSink {
    fn append_record(&mut self, fields: &[String]) -> io::Result<()>;
}

/// Tab-separated append-only log file.
///
/// Every record is on disk by the time `append_record` returns, so a crash
/// of the monitor loses at most the tick in progress.
pub struct TsvLogSink {
    path: PathBuf,
    writer: LineWriter<File>,
}

impl TsvLogSink {
    /// Opens `path` for appending. The header is written only when this call
    /// creates the file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MonitorError> {
        let path = path.into();
        let sink_err = |source| MonitorError::Sink {
            path: path.clone(),
            source,
        };

        let created = OpenOptions::new().append(true).create_new(true).open(&path);
        let mut sink = match created {
            Ok(file) => {
                let mut sink = TsvLogSink {
                    path: path.clone(),
                    writer: LineWriter::new(file),
                };
                sink.write_line(&HEADER).map_err(sink_err)?;
                sink
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                let file = OpenOptions::new()
                    .append(true)
                    .open(&path)
                    .map_err(sink_err)?;
                TsvLogSink {
                    path: path.clone(),
                    writer: LineWriter::new(file),
                }
            }
            Err(err) => return Err(sink_err(err)),
        };
        sink.writer.flush().map_err(sink_err)?;
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line<S: AsRef<str>>(&mut self, fields: &[S]) -> io::Result<()> {
        let line = fields
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(FIELD_DELIMITER);
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")
    }
}

impl SampleSink for TsvLogSink {
    fn append_record(&mut self, fields: &[String]) -> io::Result<()> {
        self.write_line(fields)?;
        self.writer.flush()
    }
}

impl Drop for TsvLogSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// `<basename>_log.tsv`, where basename is whatever follows the last `/`.
pub fn log_file_name(process: &str) -> String {
    let base = process.rsplit('/').next().unwrap_or(process);
    format!("{}_log.tsv", base)
}
