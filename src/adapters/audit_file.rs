//! Daily audit log files
//!
//! Messages are appended to `<log_dir>/logfile_<YYYY-MM-DD>.log`, one
//! `[<timestamp>] <message>` line each. Dates and timestamps are in the
//! host's local time zone. The file for a day is created on first use and
//! appended to afterwards.

use crate::core::audit::EventLog;
use chrono::{DateTime, Local, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends audit messages to a per-day file
#[derive(Debug, Clone)]
pub struct DailyFileEventLog {
    log_dir: PathBuf,
}

impl DailyFileEventLog {
    /// Creates a log writing into `log_dir` (created on demand)
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    /// File receiving messages stamped at `timestamp`
    pub fn file_for(&self, timestamp: DateTime<Utc>) -> PathBuf {
        let local = timestamp.with_timezone(&Local);
        self.log_dir
            .join(format!("logfile_{}.log", local.format("%Y-%m-%d")))
    }

    fn try_append(&self, path: &Path, line: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.log_dir)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

impl EventLog for DailyFileEventLog {
    fn append(&self, timestamp: DateTime<Utc>, message: &str) {
        let path = self.file_for(timestamp);
        let local = timestamp.with_timezone(&Local);
        let line = format!("[{}] {}\n", local.format("%Y-%m-%d %H:%M:%S%.6f"), message);

        if let Err(e) = self.try_append(&path, &line) {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to write audit log entry"
            );
        }
    }
}
