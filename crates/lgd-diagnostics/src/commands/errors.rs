//! `lgd errors`: recent errors, pattern analysis, and subsystem activity.

use std::io::Write;

use lgd_log_tools::{Severity, analyze_error_entries, classify, newest_first};

use crate::commands::{list_entries, report_fetch_problem, step};
use crate::config::{DiagConfig, category};
use crate::query::{LogQuery, fetch_entries};
use crate::render::{banner, preview, severity_label};
use crate::runner::CommandRunner;

/// Categories the general scan reports on.
const SCAN_CATEGORIES: [&str; 3] = [category::PUBSUB, category::AIRTABLE, category::PROCESSING];

pub async fn run(
    runner: &dyn CommandRunner,
    config: &DiagConfig,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    banner(out, "CLOUD RUN ERROR DIAGNOSIS")?;

    // ── 1. Error-level entries ──────────────────────────────────
    step(out, 1, "Fetching recent errors (last 2 hours)")?;
    let query = LogQuery::for_service(config)
        .min_severity(Severity::Error)
        .limit(20)
        .freshness("2h");
    let outcome = fetch_entries(runner, &query, config).await;
    if !report_fetch_problem(out, &outcome)? {
        let errors = newest_first(outcome.entries().iter().collect());
        if errors.is_empty() {
            writeln!(out, "  No recent errors\n")?;
        } else {
            writeln!(out, "  Found {} errors:\n", errors.len())?;
            for (i, entry) in errors.iter().take(10).enumerate() {
                writeln!(
                    out,
                    "  [{}] [{}] {}",
                    i + 1, entry.timestamp.as_deref().unwrap_or("N/A"), severity_label(entry)
                )?;
                let text = entry.display_text();
                writeln!(out, "      {}\n", preview(&text, config.preview_chars))?;
            }
        }
    }

    // ── 2. General scan ─────────────────────────────────────────
    step(out, 2, "Analyzing all recent entries (last hour)")?;
    let query = LogQuery::for_service(config).limit(100).freshness("1h");
    let outcome = fetch_entries(runner, &query, config).await;
    report_fetch_problem(out, &outcome)?;
    let entries = outcome.entries();
    let report = classify(entries, &config.categories_named(&SCAN_CATEGORIES));

    writeln!(out, "  Total entries: {}", report.total)?;
    writeln!(out, "  Errors: {}", report.errors.len())?;
    writeln!(out, "  Warnings: {}\n", report.warning_count)?;
    if !report.errors.is_empty() {
        writeln!(out, "  Latest errors:")?;
        list_entries(out, &report.errors, 5, 250)?;
        writeln!(out)?;

        let analysis = analyze_error_entries(&report.errors);
        writeln!(
            out,
            "  Error patterns ({}% classified):",
            analysis.classification_rate
        )?;
        for pattern in &analysis.patterns {
            writeln!(
                out,
                "    {:<18} {:>3}  {}",
                pattern.category, pattern.count, pattern.description
            )?;
            if let Some(example) = pattern.examples.first() {
                writeln!(out, "      e.g. {}", preview(example, 150))?;
            }
        }
        if analysis.unclassified_count > 0 {
            writeln!(out, "    {:<18} {:>3}", "unclassified", analysis.unclassified_count)?;
        }
        writeln!(out)?;
    }

    // ── 3. Pub/Sub ──────────────────────────────────────────────
    step(out, 3, "Looking for Pub/Sub activity")?;
    let pubsub = report.entries(category::PUBSUB);
    if pubsub.is_empty() {
        writeln!(out, "  No Pub/Sub entries found\n")?;
    } else {
        writeln!(out, "  Found {} Pub/Sub entries:\n", pubsub.len())?;
        list_entries(out, pubsub, 5, 150)?;
        writeln!(out)?;
    }

    // ── 4. Airtable ─────────────────────────────────────────────
    step(out, 4, "Looking for Airtable activity")?;
    match report.category(category::AIRTABLE) {
        Some(airtable) if !airtable.entries.is_empty() => {
            let success = airtable.success.as_deref().unwrap_or_default();
            let failure = airtable.failure.as_deref().unwrap_or_default();
            writeln!(out, "  Found {} Airtable entries", airtable.entries.len())?;
            writeln!(out, "    Succeeded: {}", success.len())?;
            writeln!(out, "    Failed: {}\n", failure.len())?;
            if !failure.is_empty() {
                writeln!(out, "  Airtable failures:")?;
                list_entries(out, failure, 5, 200)?;
                writeln!(out)?;
            }
        }
        _ => writeln!(out, "  No Airtable entries found\n")?,
    }

    // ── 5. Message processing ───────────────────────────────────
    step(out, 5, "Looking for message processing")?;
    let processing = report.entries(category::PROCESSING);
    if processing.is_empty() {
        writeln!(out, "  No processing entries found\n")?;
    } else {
        writeln!(out, "  Found {} processing entries:\n", processing.len())?;
        list_entries(out, processing, 5, 150)?;
        writeln!(out)?;
    }

    banner(out, "DIAGNOSIS COMPLETE")?;
    Ok(())
}
