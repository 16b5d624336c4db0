//! Message composition for the console and file sinks
//!
//! Both sinks share one structure: a `timestamp | SEVERITY | LAYER` header
//! followed by the message, optional context dump, optional stack frames and
//! optional error code. The console variant adds ANSI styling, the file
//! variant never does.

use chrono::{DateTime, Local};
use colored::Colorize;
use serde_json::Value;

use crate::report::{ErrorReport, RecordOptions};
use crate::severity::Severity;
use crate::stack::{format_stack_plain, format_stack_styled, parse_stack};

/// Placeholder written when a context value cannot be rendered
pub const CONTEXT_PLACEHOLDER: &str = "[unrenderable context]";

/// Nesting depth beyond which context values are elided
const CONTEXT_MAX_DEPTH: usize = 4;

/// A fully composed entry, ready for each sink
#[derive(Debug, Clone)]
pub struct RenderedEntry {
    /// ANSI-styled message for stdout
    pub console: String,
    /// Plain-text message for the daily files, newline-terminated
    pub file: String,
}

/// Timestamp format shared by both sinks, millisecond precision
pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Compose the console and file representations of one entry
pub fn compose_entry(
    at: DateTime<Local>,
    severity: Severity,
    layer: &str,
    report: &ErrorReport,
    options: &RecordOptions,
    render_stack: bool,
) -> RenderedEntry {
    let mut header = format!(
        "{} | {} | {}",
        format_timestamp(at),
        severity.header_str(),
        layer.to_uppercase()
    );
    if severity == Severity::Error {
        if let Some(name) = &report.name {
            header.push_str(&format!(" [{}]", name));
        }
    }

    let color = severity.color();
    let mut console = format!(
        "{} {} {}",
        header.color(color).bold(),
        "|".color(color).bold(),
        report.message.color(color)
    );
    let mut file = format!("{} | {}", header, report.message);
    console.push('\n');
    file.push('\n');

    if let Some(context) = &options.context {
        let dump = render_context(context);
        console.push_str(&format!("{}\n", format!("Context: {}", dump).dimmed()));
        file.push_str(&format!("Context: {}\n", dump));
    }

    if render_stack {
        if let Some(stack) = &report.stack {
            let frames = parse_stack(stack);
            if !frames.is_empty() {
                console.push_str(&format_stack_styled(&frames));
                file.push_str(&format_stack_plain(&frames));
            }
        }
    }

    if severity == Severity::Error {
        if let Some(code) = &report.code {
            console.push_str(&format!("{}\n", format!("Code: {}", code).color(color)));
            file.push_str(&format!("Code: {}\n", code));
        }
    }

    RenderedEntry { console, file }
}

/// Render a context value with bounded nesting depth
///
/// Structures deeper than [`CONTEXT_MAX_DEPTH`] are elided rather than
/// expanded, so an arbitrarily nested value can never blow up a log line.
pub fn render_context(value: &Value) -> String {
    let mut out = String::new();
    render_value(value, 0, &mut out);
    out
}

fn render_value(value: &Value, depth: usize, out: &mut String) {
    if depth >= CONTEXT_MAX_DEPTH {
        match value {
            Value::Array(_) => out.push_str("[…]"),
            Value::Object(_) => out.push_str("{…}"),
            other => out.push_str(&other.to_string()),
        }
        return;
    }
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_value(item, depth + 1, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push_str(": ");
                render_value(item, depth + 1, out);
            }
            out.push('}');
        }
        other => out.push_str(&other.to_string()),
    }
}

/// Render rows as an aligned console table
///
/// Object rows become columns keyed by field name (order of first
/// appearance); scalar rows fall into a single `value` column. Returns
/// `None` for an empty row set.
pub fn render_table(rows: &[Value]) -> Option<String> {
    if rows.is_empty() {
        return None;
    }

    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(map) = row {
            for key in map.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    let scalar_only = columns.is_empty();
    if scalar_only {
        columns.push("value".to_string());
    }

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for row in rows {
        match row {
            Value::Object(map) if !scalar_only => {
                cells.push(
                    columns
                        .iter()
                        .map(|c| map.get(c).map(cell_text).unwrap_or_default())
                        .collect(),
                );
            }
            other => {
                let mut line = vec![cell_text(other)];
                line.resize(columns.len(), String::new());
                cells.push(line);
            }
        }
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    append_row(&mut out, &columns, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    append_row(&mut out, &separator, &widths);
    for row in &cells {
        append_row(&mut out, row, &widths);
    }
    Some(out)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn append_row(out: &mut String, cells: &[String], widths: &[usize]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        let pad = widths[i].saturating_sub(cell.chars().count());
        out.push_str(&" ".repeat(pad));
    }
    // Trailing pad spaces are harmless on screen but trimmed for cleanliness
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_time() -> DateTime<Local> {
        use chrono::TimeZone;
        Local.with_ymd_and_hms(2025, 1, 1, 12, 30, 45).unwrap()
    }

    #[test]
    fn test_file_message_header_and_message() {
        let report = ErrorReport::msg("server listening");
        let entry = compose_entry(
            sample_time(),
            Severity::Info,
            "http",
            &report,
            &RecordOptions::default(),
            false,
        );
        assert_eq!(entry.file, "2025-01-01 12:30:45.000 | INFO | HTTP | server listening\n");
    }

    #[test]
    fn test_file_message_error_has_name_tag_and_code() {
        let mut report = ErrorReport::msg("conn refused")
            .with_code("ECONNREFUSED")
            .with_stack("Error: conn refused\n    at connect (src/db.rs:42:7)");
        report.name = Some("Error".to_string());
        let entry = compose_entry(
            sample_time(),
            Severity::Error,
            "db",
            &report,
            &RecordOptions::default(),
            true,
        );
        let lines: Vec<_> = entry.file.lines().collect();
        assert_eq!(lines[0], "2025-01-01 12:30:45.000 | ERROR | DB [Error] | conn refused");
        assert_eq!(lines[1], "  → connect (src/db.rs:42:7)");
        assert_eq!(lines[2], "Code: ECONNREFUSED");
    }

    #[test]
    fn test_name_tag_only_for_error_severity() {
        let mut report = ErrorReport::msg("fine");
        report.name = Some("Error".to_string());
        let entry = compose_entry(
            sample_time(),
            Severity::Info,
            "db",
            &report,
            &RecordOptions::default(),
            false,
        );
        assert!(!entry.file.contains("[Error]"));
    }

    #[test]
    fn test_context_appended_to_both_sinks() {
        let entry = compose_entry(
            sample_time(),
            Severity::Debug,
            "socket",
            &ErrorReport::msg("frame received"),
            &RecordOptions::with_context(json!({"bytes": 128})),
            false,
        );
        assert!(entry.file.contains("Context: {bytes: 128}"));
        assert!(entry.console.contains("Context: {bytes: 128}"));
    }

    #[test]
    fn test_stack_rendered_only_when_requested() {
        let report =
            ErrorReport::msg("slow query").with_stack("trace\n    at query (src/db.rs:9:1)");
        let without = compose_entry(
            sample_time(),
            Severity::Debug,
            "db",
            &report,
            &RecordOptions::default(),
            false,
        );
        let with = compose_entry(
            sample_time(),
            Severity::Debug,
            "db",
            &report,
            &RecordOptions::default(),
            true,
        );
        assert!(!without.file.contains("→"));
        assert!(with.file.contains("  → query (src/db.rs:9:1)"));
    }

    #[test]
    fn test_render_context_depth_limit() {
        let value = json!({"a": {"b": {"c": {"d": {"e": 1}}}}});
        let dump = render_context(&value);
        assert!(dump.contains("{…}"));
        assert!(!dump.contains('e'));
    }

    #[test]
    fn test_render_table_objects() {
        let rows = vec![
            json!({"name": "alice", "age": 30}),
            json!({"name": "bob", "age": 9}),
        ];
        let table = render_table(&rows).unwrap();
        let lines: Vec<_> = table.lines().collect();
        // serde_json object keys keep insertion order only with
        // preserve_order; assert on content rather than column order
        assert!(lines[0].contains("name"));
        assert!(lines[0].contains("age"));
        assert!(lines[2].contains("alice"));
        assert!(lines[3].contains("bob"));
    }

    #[test]
    fn test_render_table_scalars_and_empty() {
        let rows = vec![json!(1), json!("two")];
        let table = render_table(&rows).unwrap();
        assert!(table.starts_with("value"));
        assert!(table.contains("two"));
        assert!(render_table(&[]).is_none());
    }
}
