//! `lgd analyze`: offline analysis of a file written by `lgd collect`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use lgd_log_tools::{LogEntry, classify, newest_first};

use crate::commands::collect::{COLLECTED_FILE, CollectedLogs};
use crate::commands::report_fetch_problem;
use crate::config::{DiagConfig, category};
use crate::query::FetchOutcome;
use crate::render::{entry_line, preview};
use crate::status::ServiceHealth;

const PUBSUB_SHOWN: usize = 10;
const HISTORY_SHOWN: usize = 10;
const ERRORS_SHOWN: usize = 5;

/// Where `collect` leaves its JSON for this config.
pub fn default_input(config: &DiagConfig) -> PathBuf {
    config.output_dir.join(COLLECTED_FILE)
}

/// Read and parse a collected-logs file.
pub fn load(path: &Path) -> anyhow::Result<CollectedLogs> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("{} not found or unreadable", path.display()))?;
    serde_json::from_str(&body)
        .with_context(|| format!("{} is not a collected-logs file", path.display()))
}

fn numbered(
    out: &mut dyn Write,
    entries: &[&LogEntry],
    max: usize,
    chars: usize,
) -> std::io::Result<()> {
    for (i, entry) in entries.iter().take(max).enumerate() {
        writeln!(out, "\n{}. {}", i + 1, entry_line(entry, chars))?;
    }
    Ok(())
}

/// Print the analysis of already-loaded logs.
pub fn analyze(
    collected: &CollectedLogs,
    config: &DiagConfig,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    writeln!(out, "=== CLOUD RUN LOG ANALYSIS ===\n")?;

    if let Some(recent) = collected.logs.first() {
        let outcome = FetchOutcome::from_exec(recent.result.clone());
        if !report_fetch_problem(out, &outcome)? {
            let entries = outcome.entries();
            let defs = config.categories_named(&[category::PUBSUB, category::HISTORY]);
            let report = classify(entries, &defs);
            let pubsub = report.entries(category::PUBSUB);
            let history = report.entries(category::HISTORY);
            let errors = newest_first(entries.iter().filter(|e| e.has_error_severity()).collect());

            writeln!(out, "Entries found: {}\n", report.total)?;
            writeln!(out, "Pub/Sub entries: {}", pubsub.len())?;
            writeln!(out, "History entries: {}", history.len())?;
            writeln!(out, "Error entries: {}\n", errors.len())?;

            writeln!(out, "=== LATEST PUB/SUB ENTRIES ===")?;
            numbered(out, pubsub, PUBSUB_SHOWN, 200)?;
            writeln!(out, "\n=== LATEST HISTORY ENTRIES ===")?;
            numbered(out, history, HISTORY_SHOWN, 200)?;

            if errors.is_empty() {
                writeln!(out, "\nNo recent errors found")?;
            } else {
                writeln!(out, "\n=== ERRORS FOUND ===")?;
                numbered(out, &errors, ERRORS_SHOWN, 300)?;
            }
        }
    } else {
        writeln!(out, "No log queries recorded")?;
    }

    if let Some(service) = &collected.service_status {
        writeln!(out, "\n=== SERVICE STATUS ===")?;
        if service.success {
            writeln!(out, "Service reachable")?;
            match ServiceHealth::from_describe_json(&service.output) {
                Ok(health) => {
                    writeln!(out, "Latest revision: {}", health.latest_revision)?;
                    writeln!(out, "State: {}", health.ready)?;
                    if let Some(url) = &health.url {
                        writeln!(out, "URL: {url}")?;
                    }
                }
                Err(_) => writeln!(out, "Info: {}", preview(&service.output, 200))?,
            }
        } else {
            writeln!(out, "Error: {}", service.error)?;
        }
    }

    writeln!(out, "\n=== DIAGNOSIS ===")?;
    writeln!(out, "Observed pattern:")?;
    writeln!(out, "- Pub/Sub notifications ARE arriving")?;
    writeln!(out, "- but no new messages are found to process")?;
    writeln!(out, "- Possible causes:")?;
    writeln!(out, "  1. The saved historyId is too far ahead")?;
    writeln!(out, "  2. Messages are not reaching INBOX")?;
    writeln!(out, "  3. The notification historyId is <= the saved one")?;
    writeln!(out, "\nSuggested fix:")?;
    writeln!(out, "- Run /reset to restart the historyId")?;
    writeln!(out, "- Or check INBOX for new emails manually")?;
    Ok(())
}

pub fn run(file: Option<&Path>, config: &DiagConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    let path = file.map_or_else(|| default_input(config), Path::to_path_buf);
    tracing::info!(path = %path.display(), "analyzing collected logs");
    let collected = load(&path)?;
    analyze(&collected, config, out)
}
