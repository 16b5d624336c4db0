//! Stack-trace parsing and formatting
//!
//! Raw stacks arrive as multi-line strings. The first line duplicates the
//! error message and is discarded; every following line either matches one
//! of the two call-site shapes or is kept verbatim as a raw frame.

use colored::Colorize;

/// One parsed (or raw) stack frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Function name, if the line named one
    pub function: Option<String>,
    /// Source file of the call site
    pub file: Option<String>,
    /// Line number within the file
    pub line: Option<u32>,
    /// Column within the line
    pub column: Option<u32>,
    /// Original text for lines matching neither call-site shape
    pub raw: Option<String>,
}

impl StackFrame {
    fn parsed(function: Option<String>, file: String, line: Option<u32>, column: Option<u32>) -> Self {
        Self {
            function,
            file: Some(file),
            line,
            column,
            raw: None,
        }
    }

    fn raw(text: String) -> Self {
        Self {
            function: None,
            file: None,
            line: None,
            column: None,
            raw: Some(text),
        }
    }

    /// Frames carrying neither a call site nor raw text are dropped
    fn is_empty(&self) -> bool {
        self.file.is_none() && self.raw.is_none()
    }
}

/// Parse a raw multi-line stack trace into frames
///
/// Accepted shapes per line, after trimming:
/// - `at <function> (<file>:<line>:<col>)`
/// - `at <file>:<line>:<col>` (anonymous call site)
pub fn parse_stack(stack: &str) -> Vec<StackFrame> {
    stack
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(parse_frame)
        .filter(|frame| !frame.is_empty())
        .collect()
}

fn parse_frame(line: &str) -> StackFrame {
    let trimmed = line.trim();

    if let Some(rest) = trimmed.strip_prefix("at ") {
        let rest = rest.trim();
        // Named shape: the call site sits in trailing parentheses
        if rest.ends_with(')') {
            if let Some(open) = rest.rfind('(') {
                let function = rest[..open].trim();
                let site = &rest[open + 1..rest.len() - 1];
                if let Some((file, line_no, col)) = split_site(site) {
                    let function = if function.is_empty() {
                        None
                    } else {
                        Some(function.to_string())
                    };
                    return StackFrame::parsed(function, file, line_no, col);
                }
            }
        }
        // Anonymous shape: the rest of the line is the call site itself
        if let Some((file, line_no, col)) = split_site(rest) {
            return StackFrame::parsed(None, file, line_no, col);
        }
    }

    StackFrame::raw(trimmed.to_string())
}

/// Split `<file>:<line>:<col>` from the right, so Windows drive letters and
/// embedded colons in the path survive
fn split_site(site: &str) -> Option<(String, Option<u32>, Option<u32>)> {
    let (rest, col) = site.rsplit_once(':')?;
    let (file, line) = rest.rsplit_once(':')?;
    let col: u32 = col.parse().ok()?;
    let line: u32 = line.parse().ok()?;
    if file.is_empty() {
        return None;
    }
    Some((file.to_string(), Some(line), Some(col)))
}

/// Render parsed frames one per line, without styling (file sink)
pub fn format_stack_plain(frames: &[StackFrame]) -> String {
    let mut out = String::new();
    for frame in frames {
        out.push_str(&frame_line(frame));
        out.push('\n');
    }
    out
}

/// Render parsed frames one per line, dimmed (console sink)
pub fn format_stack_styled(frames: &[StackFrame]) -> String {
    let mut out = String::new();
    for frame in frames {
        out.push_str(&frame_line(frame).dimmed().to_string());
        out.push('\n');
    }
    out
}

fn frame_line(frame: &StackFrame) -> String {
    if let Some(raw) = &frame.raw {
        return raw.clone();
    }
    let file = frame.file.as_deref().unwrap_or("?");
    let line = frame.line.unwrap_or(0);
    let column = frame.column.unwrap_or(0);
    match &frame.function {
        Some(function) => format!("  → {} ({}:{}:{})", function, file, line, column),
        None => format!("  → {}:{}:{}", file, line, column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_frame() {
        let stack = "Error: boom\n    at connect (src/db.rs:42:7)";
        let frames = parse_stack(stack);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].function.as_deref(), Some("connect"));
        assert_eq!(frames[0].file.as_deref(), Some("src/db.rs"));
        assert_eq!(frames[0].line, Some(42));
        assert_eq!(frames[0].column, Some(7));
    }

    #[test]
    fn test_parse_anonymous_frame() {
        let stack = "Error: boom\n    at src/main.rs:10:5";
        let frames = parse_stack(stack);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].function.is_none());
        assert_eq!(frames[0].file.as_deref(), Some("src/main.rs"));
        assert_eq!(frames[0].line, Some(10));
        assert_eq!(frames[0].column, Some(5));
    }

    #[test]
    fn test_parse_keeps_malformed_lines_raw_in_order() {
        let stack = "Error: boom\n\
                     at first (a.rs:1:1)\n\
                     some opaque runtime line\n\
                     at b.rs:2:2\n\
                     another raw line";
        let frames = parse_stack(stack);
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].function.as_deref(), Some("first"));
        assert_eq!(frames[1].raw.as_deref(), Some("some opaque runtime line"));
        assert_eq!(frames[2].file.as_deref(), Some("b.rs"));
        assert_eq!(frames[3].raw.as_deref(), Some("another raw line"));
    }

    #[test]
    fn test_parse_counts_parsed_and_raw() {
        let stack = "Error: x\n\
                     at f1 (a.rs:1:2)\n\
                     at f2 (b.rs:3:4)\n\
                     at c.rs:5:6\n\
                     garbage\n\
                     more garbage";
        let frames = parse_stack(stack);
        let parsed = frames.iter().filter(|f| f.file.is_some()).count();
        let raw = frames.iter().filter(|f| f.raw.is_some()).count();
        assert_eq!(parsed, 3);
        assert_eq!(raw, 2);
    }

    #[test]
    fn test_parse_drops_first_and_empty_lines() {
        let stack = "Error: only the message\n\n   \n";
        let frames = parse_stack(stack);
        assert!(frames.is_empty());
    }

    #[test]
    fn test_parse_bad_site_kept_raw() {
        // Looks like a call site but the positions are not numeric
        let stack = "Error: x\n    at broken (a.rs:one:two)";
        let frames = parse_stack(stack);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].raw.as_deref(), Some("at broken (a.rs:one:two)"));
    }

    #[test]
    fn test_format_plain() {
        let stack = "Error: x\n    at connect (src/db.rs:42:7)\n    raw line";
        let frames = parse_stack(stack);
        let text = format_stack_plain(&frames);
        assert_eq!(text, "  → connect (src/db.rs:42:7)\nraw line\n");
    }
}
