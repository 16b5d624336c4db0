//! Severity levels for recorded entries
//!
//! The `All` severity plays a dual role: it is an aggregate every entry is
//! mirrored into, and a real severity callers can record at directly.

use colored::Color;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Debug,
    Log,
    Warning,
    Error,
    All,
}

/// Every severity, in counter/display order
pub const ALL_SEVERITIES: [Severity; 6] = [
    Severity::Info,
    Severity::Debug,
    Severity::Log,
    Severity::Warning,
    Severity::Error,
    Severity::All,
];

impl Severity {
    /// Lower-case name, used for file names (`<name>.log`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Debug => "debug",
            Severity::Log => "log",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::All => "all",
        }
    }

    /// Upper-case name, used in message headers
    pub fn header_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Log => "LOG",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::All => "ALL",
        }
    }

    /// Console color for this severity
    pub fn color(&self) -> Color {
        match self {
            Severity::Info => Color::Cyan,
            Severity::Debug => Color::Magenta,
            Severity::Log => Color::White,
            Severity::Warning => Color::Yellow,
            Severity::Error => Color::Red,
            Severity::All => Color::Blue,
        }
    }

    /// Check if this severity is a warning or error (suppressed on the
    /// production console)
    pub fn is_alert(&self) -> bool {
        matches!(self, Severity::Warning | Severity::Error)
    }

    /// Position in [`ALL_SEVERITIES`], used to index the counter array
    pub fn index(&self) -> usize {
        match self {
            Severity::Info => 0,
            Severity::Debug => 1,
            Severity::Log => 2,
            Severity::Warning => 3,
            Severity::Error => 4,
            Severity::All => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_names() {
        assert_eq!(Severity::Info.as_str(), "info");
        assert_eq!(Severity::Warning.as_str(), "warning");
        assert_eq!(Severity::All.as_str(), "all");
        assert_eq!(Severity::Error.header_str(), "ERROR");
    }

    #[test]
    fn test_severity_is_alert() {
        assert!(!Severity::Info.is_alert());
        assert!(!Severity::Debug.is_alert());
        assert!(!Severity::Log.is_alert());
        assert!(!Severity::All.is_alert());
        assert!(Severity::Warning.is_alert());
        assert!(Severity::Error.is_alert());
    }

    #[test]
    fn test_severity_index_matches_order() {
        for (i, severity) in ALL_SEVERITIES.iter().enumerate() {
            assert_eq!(severity.index(), i);
        }
    }
}
