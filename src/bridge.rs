//! tracing integration
//!
//! Forwards `tracing` events into a shared [`Recorder`]: the event target
//! becomes the layer label, the `message` field becomes the payload, and
//! remaining fields travel as structured context. Forwarded error events are
//! always suppressed, so library logging can never escalate into the caller.

use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use anyhow::{Context as AnyhowContext, Result};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::recorder::Recorder;
use crate::report::{ErrorReport, RecordOptions};
use crate::severity::Severity;

/// A tracing `Layer` that records every event through a [`Recorder`]
pub struct RecorderLayer {
    recorder: Arc<Recorder>,
}

impl RecorderLayer {
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self { recorder }
    }
}

/// Map tracing verbosity onto recorder severities
fn severity_for(level: tracing::Level) -> Severity {
    match level {
        tracing::Level::TRACE | tracing::Level::DEBUG => Severity::Debug,
        tracing::Level::INFO => Severity::Info,
        tracing::Level::WARN => Severity::Warning,
        tracing::Level::ERROR => Severity::Error,
    }
}

impl<S> Layer<S> for RecorderLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let severity = severity_for(*metadata.level());

        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        let report = ErrorReport::msg(visitor.message.unwrap_or_default());
        let mut options = RecordOptions::suppressed();
        if !visitor.fields.is_empty() {
            options.context = Some(serde_json::Value::Object(visitor.fields));
        }

        self.recorder
            .record(severity, metadata.target(), report, options);
    }
}

/// Install a recorder as the process-wide tracing subscriber
///
/// Respects `RUST_LOG` when set, falling back to `default_filter`.
pub fn install(recorder: Arc<Recorder>, default_filter: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(RecorderLayer::new(recorder))
        .try_init()
        .context("Failed to install tracing subscriber")
}

/// Visitor that splits the message field from the structured rest
struct FieldVisitor {
    message: Option<String>,
    fields: serde_json::Map<String, serde_json::Value>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            message: None,
            fields: serde_json::Map::new(),
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let mut buf = String::new();
        let _ = write!(&mut buf, "{:?}", value);
        if field.name() == "message" {
            self.message = Some(buf);
        } else {
            self.fields
                .insert(field.name().to_string(), serde_json::Value::String(buf));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(value.to_string()),
            );
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::Number(value.into()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::Bool(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.fields
                .insert(field.name().to_string(), serde_json::Value::Number(n));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(
            field.name().to_string(),
            serde_json::Value::String(value.to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecorderConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_layer_forwards_events_to_files() {
        let temp = TempDir::new().unwrap();
        let recorder =
            Arc::new(Recorder::new(RecorderConfig::at_root(temp.path().join("logs"))).unwrap());
        let layer = RecorderLayer::new(Arc::clone(&recorder));

        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(count = 42, "bridged message");
            tracing::error!("bridged failure");
        });

        let stats = recorder.stats();
        assert_eq!(stats.info, 1);
        assert_eq!(stats.error, 1);

        let day = fs::read_dir(recorder.config().root.clone())
            .unwrap()
            .filter_map(|e| e.ok())
            .find(|e| e.path().is_dir())
            .unwrap();
        let info = fs::read_to_string(day.path().join("info.log")).unwrap();
        assert!(info.contains("bridged message"));
        assert!(info.contains("count: 42"));
        let error = fs::read_to_string(day.path().join("error.log")).unwrap();
        assert!(error.contains("bridged failure"));
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(severity_for(tracing::Level::TRACE), Severity::Debug);
        assert_eq!(severity_for(tracing::Level::DEBUG), Severity::Debug);
        assert_eq!(severity_for(tracing::Level::INFO), Severity::Info);
        assert_eq!(severity_for(tracing::Level::WARN), Severity::Warning);
        assert_eq!(severity_for(tracing::Level::ERROR), Severity::Error);
    }
}
