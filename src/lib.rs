//! Logbook - process-wide structured log recorder
//!
//! Provides leveled logging with two independent sinks (colorized console,
//! plain-text daily files), size-based rotation, retention of daily
//! directories, per-severity counters, and a tracing bridge.

pub mod bridge;
pub mod config;
pub mod format;
pub mod recorder;
pub mod report;
pub mod retention;
pub mod severity;
mod sink;
pub mod stack;
pub mod stats;

pub use config::RecorderConfig;
pub use recorder::{Recorded, Recorder};
pub use report::{ErrorReport, Escalated, RecordOptions};
pub use severity::Severity;
pub use stats::LogStats;
