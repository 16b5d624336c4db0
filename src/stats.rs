//! Per-severity counters
//!
//! Counters live in process memory for the lifetime of the recorder. Every
//! recorded entry increments its own severity and the `all` aggregate; an
//! entry recorded directly at `all` increments the aggregate exactly once.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::severity::{Severity, ALL_SEVERITIES};

/// Shared counter state, one slot per severity
#[derive(Debug, Default)]
pub(crate) struct StatCounters {
    counts: [AtomicU64; 6],
}

impl StatCounters {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Count one entry recorded at `severity`
    pub(crate) fn record(&self, severity: Severity) {
        self.counts[severity.index()].fetch_add(1, Ordering::Relaxed);
        if severity != Severity::All {
            self.counts[Severity::All.index()].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Snapshot a copy of the current counts
    pub(crate) fn snapshot(&self) -> LogStats {
        let mut stats = LogStats::default();
        for severity in ALL_SEVERITIES {
            let count = self.counts[severity.index()].load(Ordering::Relaxed);
            match severity {
                Severity::Info => stats.info = count,
                Severity::Debug => stats.debug = count,
                Severity::Log => stats.log = count,
                Severity::Warning => stats.warning = count,
                Severity::Error => stats.error = count,
                Severity::All => stats.all = count,
            }
        }
        stats
    }

    /// Reset every counter to zero
    pub(crate) fn reset(&self) {
        for slot in &self.counts {
            slot.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time copy of the recorder's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStats {
    pub info: u64,
    pub debug: u64,
    pub log: u64,
    pub warning: u64,
    pub error: u64,
    /// Aggregate count of every recorded entry
    pub all: u64,
}

impl LogStats {
    /// Count for one severity
    pub fn get(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Info => self.info,
            Severity::Debug => self.debug,
            Severity::Log => self.log,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
            Severity::All => self.all,
        }
    }
}
