//! Retention sweep for daily log directories
//!
//! Deletes dated directories under the log root once their last-modified
//! time falls outside the retention window. Best-effort maintenance:
//! failures are reported to stderr and skipped.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Default retention period in days
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

/// Delete daily directories older than the retention period
///
/// Returns the number of directories deleted.
pub fn sweep_old_directories(root: &Path, retention_days: u64) -> usize {
    let retention = Duration::from_secs(retention_days * 24 * 60 * 60);
    let cutoff = SystemTime::now()
        .checked_sub(retention)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    sweep_directories_before(root, cutoff)
}

/// Delete daily directories last modified before `cutoff`
pub(crate) fn sweep_directories_before(root: &Path, cutoff: SystemTime) -> usize {
    if !root.exists() {
        return 0;
    }

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("logbook: failed to read log root {}: {}", root.display(), e);
            return 0;
        }
    };

    let mut deleted = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => continue,
        };

        if modified < cutoff {
            match fs::remove_dir_all(&path) {
                Ok(()) => deleted += 1,
                Err(e) => {
                    eprintln!(
                        "logbook: failed to delete old log directory {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }
    }

    deleted
}
