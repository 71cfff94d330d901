//! Console formatting helpers shared by the subcommands.

use std::io::{self, Write};

use lgd_log_tools::LogEntry;

const RULE_WIDTH: usize = 70;

/// The first `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// `=====` / title / `=====`.
pub fn banner(out: &mut dyn Write, title: &str) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, "  {title}")?;
    writeln!(out, "{rule}")?;
    writeln!(out)
}

/// `[timestamp] preview`, with `N/A` for a missing timestamp.
pub fn entry_line(entry: &LogEntry, max_chars: usize) -> String {
    format!(
        "[{}] {}",
        entry.timestamp.as_deref().unwrap_or("N/A"),
        preview(&entry.display_text(), max_chars)
    )
}

/// Severity label, `N/A` when absent.
pub fn severity_label(entry: &LogEntry) -> &'static str {
    entry.severity.map_or("N/A", |s| s.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lgd_log_tools::Severity;

    #[test]
    fn preview_counts_characters() {
        assert_eq!(preview("héllo wörld", 5), "héllo");
        assert_eq!(preview("short", 50), "short");
        assert_eq!(preview("", 3), "");
        assert_eq!(preview("abc", 0), "");
    }

    #[test]
    fn entry_line_formats() {
        let entry = LogEntry::text("2024-01-01T10:00:00Z", Severity::Info, "abcdef");
        assert_eq!(entry_line(&entry, 3), "[2024-01-01T10:00:00Z] abc");
        assert_eq!(entry_line(&LogEntry::default(), 10), "[N/A] ");
    }

    #[test]
    fn banner_layout() {
        let mut buf = Vec::new();
        banner(&mut buf, "ERRORES").unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[1], "  ERRORES");
        assert_eq!(lines[0].len(), RULE_WIDTH);
    }

    #[test]
    fn severity_label_defaults() {
        assert_eq!(severity_label(&LogEntry::default()), "N/A");
        let entry = LogEntry::text("t", Severity::Warning, "x");
        assert_eq!(severity_label(&entry), "WARNING");
    }
}
