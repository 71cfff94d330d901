//! Subcommands. Each one builds queries, runs them, classifies, and prints.
//!
//! Commands write their report to `out` and keep going after external
//! failures; they only return an error when the report itself cannot be
//! written.

pub mod analyze;
pub mod collect;
pub mod emails;
pub mod errors;
pub mod logs;
pub mod status;

use std::io::{self, Write};

use lgd_log_tools::LogEntry;

use crate::query::FetchOutcome;
use crate::render::{entry_line, preview};

/// Raw output shown when a query returns something that is not JSON.
pub(crate) const RAW_PREVIEW_CHARS: usize = 2000;

/// Report timestamp in local time.
pub fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `[n] title...`
pub(crate) fn step(out: &mut dyn Write, n: usize, title: &str) -> io::Result<()> {
    writeln!(out, "[{n}] {title}...")
}

/// Print up to `max` entries as `  [timestamp] preview`.
pub(crate) fn list_entries(
    out: &mut dyn Write,
    entries: &[&LogEntry],
    max: usize,
    chars: usize,
) -> io::Result<()> {
    for entry in entries.iter().take(max) {
        writeln!(out, "  {}", entry_line(entry, chars))?;
    }
    Ok(())
}

/// Explain why a fetch produced no entries. Returns true if it did fail.
pub(crate) fn report_fetch_problem(
    out: &mut dyn Write,
    outcome: &FetchOutcome,
) -> io::Result<bool> {
    match outcome {
        FetchOutcome::Entries(_) => Ok(false),
        FetchOutcome::Failed(result) => {
            writeln!(out, "  ! Query failed (exit code {})", result.exit_code)?;
            if !result.error.is_empty() {
                writeln!(out, "  stderr: {}", preview(&result.error, RAW_PREVIEW_CHARS))?;
            }
            writeln!(out)?;
            Ok(true)
        }
        FetchOutcome::Malformed { error, raw } => {
            writeln!(out, "  ! Could not parse query output: {error}")?;
            writeln!(out, "  {}", preview(raw, RAW_PREVIEW_CHARS))?;
            writeln!(out)?;
            Ok(true)
        }
    }
}
