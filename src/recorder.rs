//! The structured log recorder
//!
//! One [`Recorder`] serves the whole process: constructed once at startup,
//! shared behind an `Arc`, torn down implicitly at process exit. Every call
//! formats the entry for both sinks, appends it to the severity file and the
//! `all` aggregate, updates the counters, and echoes to stdout according to
//! the run mode.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use serde_json::Value;

use crate::config::RecorderConfig;
use crate::format::{compose_entry, render_table, CONTEXT_PLACEHOLDER};
use crate::report::{ErrorReport, Escalated, RecordOptions};
use crate::retention::sweep_old_directories;
use crate::severity::Severity;
use crate::sink::DailySink;
use crate::stats::{LogStats, StatCounters};

/// Result of one trip through the record pipeline
///
/// The pipeline itself never fails; an error-severity entry that should be
/// surfaced to the caller comes back as an `escalation`, and the thin
/// [`Recorder::error`] wrapper turns it into an `Err`.
#[derive(Debug)]
pub struct Recorded {
    /// Present when the entry should be propagated as a failure
    pub escalation: Option<Escalated>,
}

/// Process-wide structured log recorder
pub struct Recorder {
    config: RecorderConfig,
    sink: DailySink,
    counters: StatCounters,
}

impl Recorder {
    /// Create a recorder, creating the log root if needed
    ///
    /// Idempotent: an existing root directory is left as is. A retention
    /// window of zero days is clamped to one so the sweep can never touch
    /// the directory live writes are targeting.
    pub fn new(config: RecorderConfig) -> Result<Self> {
        let mut config = config;
        if config.retention_days == 0 {
            config.retention_days = 1;
        }
        std::fs::create_dir_all(&config.root).context("Failed to create log root directory")?;

        let sink = DailySink::new(config.root.clone(), config.max_file_size);
        Ok(Self {
            config,
            sink,
            counters: StatCounters::new(),
        })
    }

    /// The configuration this recorder was built with
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Spawn the periodic retention sweep on the current tokio runtime
    ///
    /// Sweeps once immediately, then on the configured interval, for the
    /// lifetime of the process.
    pub fn spawn_retention_sweep(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let period = Duration::from_secs(self.config.sweep_interval_secs.max(1));
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let root = self.config.root.clone();
                let days = self.config.retention_days;
                let deleted = tokio::task::spawn_blocking(move || {
                    sweep_old_directories(&root, days)
                })
                .await
                .unwrap_or(0);
                if deleted > 0 {
                    self.info(
                        "logbook",
                        format!("Deleted {} expired log directories", deleted),
                    );
                }
            }
        })
    }

    /// Record an info-severity message
    pub fn info(&self, layer: &str, message: impl Into<String>) {
        self.record(
            Severity::Info,
            layer,
            ErrorReport::msg(message),
            RecordOptions::default(),
        );
    }

    /// Record a debug-severity message
    pub fn debug(&self, layer: &str, message: impl Into<String>) {
        self.record(
            Severity::Debug,
            layer,
            ErrorReport::msg(message),
            RecordOptions::default(),
        );
    }

    /// Record a log-severity message
    pub fn log(&self, layer: &str, message: impl Into<String>) {
        self.record(
            Severity::Log,
            layer,
            ErrorReport::msg(message),
            RecordOptions::default(),
        );
    }

    /// Record a warning-severity message
    pub fn warning(&self, layer: &str, message: impl Into<String>) {
        self.record(
            Severity::Warning,
            layer,
            ErrorReport::msg(message),
            RecordOptions::default(),
        );
    }

    /// Record directly at the aggregate severity
    pub fn all(&self, layer: &str, message: impl Into<String>) {
        self.record(
            Severity::All,
            layer,
            ErrorReport::msg(message),
            RecordOptions::default(),
        );
    }

    /// Record an error-severity entry
    ///
    /// The entry is always written to both sinks first. Outside production
    /// mode, and unless `options.suppress` is set, the recorded error then
    /// comes back as `Err` so bootstrap code can abort on it.
    pub fn error(
        &self,
        layer: &str,
        report: impl Into<ErrorReport>,
        options: RecordOptions,
    ) -> Result<(), Escalated> {
        let recorded = self.record(Severity::Error, layer, report.into(), options);
        match recorded.escalation {
            Some(escalated) => Err(escalated),
            None => Ok(()),
        }
    }

    /// Argument-order-swapped convenience alias for [`Recorder::error`]
    pub fn set(
        &self,
        report: impl Into<ErrorReport>,
        layer: &str,
        options: RecordOptions,
    ) -> Result<(), Escalated> {
        self.error(layer, report, options)
    }

    /// Record a debug-severity message with a fresh call-stack snapshot
    pub fn trace(&self, layer: &str, message: impl Into<String>) {
        let message = message.into();
        let backtrace = std::backtrace::Backtrace::force_capture();
        // First stack line is discarded by the parser as a message duplicate
        let report = ErrorReport::msg(message.clone())
            .with_stack(format!("{}\n{}", message, backtrace));
        let options = RecordOptions {
            trace: true,
            ..RecordOptions::default()
        };
        self.record(Severity::Debug, layer, report, options);
    }

    /// Render rows as a console table and write them, JSON-serialized, to
    /// the log-severity sink
    ///
    /// No-op for an empty row set.
    pub fn table<T: Serialize>(&self, layer: &str, rows: &[T]) {
        if rows.is_empty() {
            return;
        }

        let values: Vec<Value> = rows
            .iter()
            .map(|row| {
                serde_json::to_value(row)
                    .unwrap_or_else(|_| Value::String(CONTEXT_PLACEHOLDER.to_string()))
            })
            .collect();
        let Some(table) = render_table(&values) else {
            return;
        };
        let json = serde_json::to_string(&values)
            .unwrap_or_else(|_| CONTEXT_PLACEHOLDER.to_string());

        self.counters.record(Severity::Log);
        let entry = compose_entry(
            Local::now(),
            Severity::Log,
            layer,
            &ErrorReport::msg(json),
            &RecordOptions::default(),
            false,
        );
        self.write_entry(Severity::Log, &entry.file);
        if self.should_echo(Severity::Log) {
            print!("{}", table);
        }
    }

    /// Run `f` between info-level start and end markers
    ///
    /// The end marker is emitted from a drop guard, so it appears even when
    /// `f` panics.
    pub fn group<R>(&self, layer: &str, title: &str, f: impl FnOnce() -> R) -> R {
        self.info(layer, format!("group start: {}", title));
        let _guard = GroupGuard {
            recorder: self,
            layer: layer.to_string(),
            title: title.to_string(),
        };
        f()
    }

    /// Snapshot a copy of the current counters
    pub fn stats(&self) -> LogStats {
        self.counters.snapshot()
    }

    /// Reset all counters to zero
    pub fn clear_stats(&self) {
        self.counters.reset();
    }

    /// The common record pipeline
    ///
    /// Counts the entry, composes both representations, writes the severity
    /// and aggregate files, echoes to stdout per the run mode, and reports
    /// whether the entry should escalate. Never fails: I/O faults go to
    /// stderr and the call continues.
    pub fn record(
        &self,
        severity: Severity,
        layer: &str,
        report: ErrorReport,
        options: RecordOptions,
    ) -> Recorded {
        self.counters.record(severity);

        let render_stack = severity == Severity::Error || options.trace;
        let entry = compose_entry(Local::now(), severity, layer, &report, &options, render_stack);

        self.write_entry(severity, &entry.file);

        if self.should_echo(severity) {
            print!("{}", entry.console);
        }

        let escalation = if severity == Severity::Error
            && !self.config.production
            && !options.suppress
        {
            Some(Escalated::from_report(&report))
        } else {
            None
        };

        Recorded { escalation }
    }

    /// Append the file rendering to the severity file and the aggregate
    fn write_entry(&self, severity: Severity, text: &str) {
        if let Err(e) = self.sink.append(severity, text) {
            eprintln!("logbook: failed to write {} log: {}", severity.as_str(), e);
        }
        if severity != Severity::All {
            if let Err(e) = self.sink.append(Severity::All, text) {
                eprintln!("logbook: failed to write all log: {}", e);
            }
        }
    }

    /// Production mode keeps errors and warnings off the console
    fn should_echo(&self, severity: Severity) -> bool {
        !(self.config.production && severity.is_alert())
    }
}

struct GroupGuard<'a> {
    recorder: &'a Recorder,
    layer: String,
    title: String,
}

impl Drop for GroupGuard<'_> {
    fn drop(&mut self) {
        self.recorder
            .info(&self.layer, format!("group end: {}", self.title));
    }
}
