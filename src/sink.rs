//! Daily file sinks with size-based rotation
//!
//! Files live at `<root>/<YYYY-MM-DD>/<severity>.log`. The dated directory
//! is created lazily on the first write of that day. Before an append, an
//! oversized canonical file is renamed to `<severity>.<epochMillis>.log` so
//! the canonical name always stays under the configured limit.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;

use crate::severity::Severity;

pub(crate) struct DailySink {
    root: PathBuf,
    max_file_size: u64,
    // Serializes appends so two writers cannot both decide to rotate
    io_lock: Mutex<()>,
}

impl DailySink {
    pub(crate) fn new(root: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            root: root.into(),
            max_file_size,
            io_lock: Mutex::new(()),
        }
    }

    /// Append `text` to today's file for `severity`
    pub(crate) fn append(&self, severity: Severity, text: &str) -> std::io::Result<()> {
        let date = Local::now().format("%Y-%m-%d").to_string();
        self.append_for_date(&date, severity, text)
    }

    /// Append to a specific dated directory
    ///
    /// The public path always passes today's date; tests pass explicit dates
    /// to exercise the partitioning.
    pub(crate) fn append_for_date(
        &self,
        date: &str,
        severity: Severity,
        text: &str,
    ) -> std::io::Result<()> {
        let _guard = self
            .io_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let dir = self.root.join(date);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.log", severity.as_str()));
        self.rotate_if_oversized(&dir, severity, &path)?;

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Rename the canonical file aside when it already exceeds the limit
    fn rotate_if_oversized(
        &self,
        dir: &Path,
        severity: Severity,
        path: &Path,
    ) -> std::io::Result<()> {
        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(_) => return Ok(()),
        };
        if size <= self.max_file_size {
            return Ok(());
        }

        let mut stamp = Local::now().timestamp_millis();
        let mut rotated = dir.join(format!("{}.{}.log", severity.as_str(), stamp));
        // Two rotations within one millisecond must not clobber each other
        while rotated.exists() {
            stamp += 1;
            rotated = dir.join(format!("{}.{}.log", severity.as_str(), stamp));
        }
        fs::rename(path, rotated)
    }
}
