//! Error payloads and per-call options
//!
//! An [`ErrorReport`] carries the fields the recorder extracts from an
//! error-like value: message, name, optional stack and code, and arbitrary
//! extra fields. Plain messages become reports with no stack.

use std::collections::BTreeMap;

use serde_json::Value;

/// Structured payload for a recorded entry
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// Human-readable message
    pub message: String,
    /// Error name (e.g. the error type), shown as a bracketed tag
    pub name: Option<String>,
    /// Raw multi-line stack trace, if one was captured
    pub stack: Option<String>,
    /// Error code, if the source carries one
    pub code: Option<String>,
    /// Additional fields attached to the source error
    pub extra: BTreeMap<String, Value>,
}

impl ErrorReport {
    /// Create a report from a plain message (no stack, no name)
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            name: None,
            stack: None,
            code: None,
            extra: BTreeMap::new(),
        }
    }

    /// Create a report from any error value, capturing its type name
    pub fn of<E: std::error::Error>(err: &E) -> Self {
        Self {
            message: err.to_string(),
            name: Some(short_type_name::<E>()),
            stack: None,
            code: None,
            extra: BTreeMap::new(),
        }
    }

    /// Attach a raw stack trace
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Attach an error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach an extra field
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl From<String> for ErrorReport {
    fn from(message: String) -> Self {
        Self::msg(message)
    }
}

impl From<&str> for ErrorReport {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

/// Last path segment of a type name, without generic arguments
fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Per-call options for a record operation
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    /// Structured auxiliary data appended to both sinks
    pub context: Option<Value>,
    /// Force stack rendering even for non-error severities
    pub trace: bool,
    /// Record the error without surfacing it to the caller
    pub suppress: bool,
}

impl RecordOptions {
    /// Options that record an error without surfacing it
    pub fn suppressed() -> Self {
        Self {
            suppress: true,
            ..Self::default()
        }
    }

    /// Options carrying structured context
    pub fn with_context(context: Value) -> Self {
        Self {
            context: Some(context),
            ..Self::default()
        }
    }
}

/// An error-severity entry surfaced back to the caller after it was
/// durably recorded
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct Escalated {
    /// Message of the recorded error
    pub message: String,
    /// Name of the recorded error, when known
    pub name: Option<String>,
    /// Code of the recorded error, when known
    pub code: Option<String>,
}

impl Escalated {
    pub(crate) fn from_report(report: &ErrorReport) -> Self {
        Self {
            message: report.message.clone(),
            name: report.name.clone(),
            code: report.code.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_message() {
        let report = ErrorReport::msg("something happened");
        assert_eq!(report.message, "something happened");
        assert!(report.name.is_none());
        assert!(report.stack.is_none());
    }

    #[test]
    fn test_report_from_error_captures_type_name() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let report = ErrorReport::of(&err);
        assert_eq!(report.message, "disk on fire");
        assert_eq!(report.name.as_deref(), Some("Error"));
    }

    #[test]
    fn test_report_builders() {
        let report = ErrorReport::msg("conn refused")
            .with_code("ECONNREFUSED")
            .with_extra("port", serde_json::json!(5432));
        assert_eq!(report.code.as_deref(), Some("ECONNREFUSED"));
        assert_eq!(report.extra["port"], serde_json::json!(5432));
    }

    #[test]
    fn test_escalated_display_uses_message() {
        let escalated = Escalated::from_report(&ErrorReport::msg("conn refused"));
        assert_eq!(escalated.to_string(), "conn refused");
    }

    #[test]
    fn test_short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name::<std::io::Error>(), "Error");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}
