//! `lgd collect`: run the diagnostic queries and persist everything for later.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Context;
use lgd_log_tools::{LogEntry, Severity};
use serde::{Deserialize, Serialize};

use crate::commands::{RAW_PREVIEW_CHARS, now_timestamp, step};
use crate::config::DiagConfig;
use crate::query::{FetchOutcome, LogQuery};
use crate::render::preview;
use crate::report::ReportWriter;
use crate::runner::{CommandRunner, ExecResult};
use crate::status::{ServiceHealth, pubsub_probe, run_probe, service_probe};

/// File names inside the output directory.
pub const COLLECTED_FILE: &str = "cloud_run_logs_diagnostico.json";
pub const SUMMARY_FILE: &str = "cloud_run_logs_resumen.txt";

const SUMMARY_RULE_WIDTH: usize = 80;
const SUMMARY_ENTRIES: usize = 5;

/// One persisted log query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub result: ExecResult,
}

/// Everything `collect` gathered, as written to [`COLLECTED_FILE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedLogs {
    pub timestamp: String,
    pub logs: Vec<QueryRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_status: Option<ExecResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubsub: Option<ExecResult>,
}

/// The three collection queries, in the order they run.
pub fn collection_queries(config: &DiagConfig) -> Vec<(&'static str, &'static str, LogQuery)> {
    vec![
        (
            "cloud_run_recent",
            "Recent Cloud Run logs (last 2 hours)",
            LogQuery::for_service(config).limit(100).freshness("2h"),
        ),
        (
            "email_processing",
            "Email processing logs",
            LogQuery::for_service(config)
                .text_matching(&["mfs.*procesar", "mfs.*email", "mfs.*pubsub", "mfs.*_pubsub"])
                .limit(50)
                .freshness("2h"),
        ),
        (
            "errors",
            "Recent errors",
            LogQuery::for_service(config)
                .min_severity(Severity::Error)
                .limit(30)
                .freshness("2h"),
        ),
    ]
}

/// Run every query and probe; failures are recorded, not returned.
pub async fn collect(
    runner: &dyn CommandRunner,
    config: &DiagConfig,
    timestamp: String,
    out: &mut dyn Write,
) -> std::io::Result<CollectedLogs> {
    let mut logs = Vec::new();
    for (i, (kind, description, query)) in collection_queries(config).into_iter().enumerate() {
        step(out, i + 1, description)?;
        writeln!(out, "  -> {description}...")?;
        let spec = query
            .to_command(&config.project_id)
            .with_description(description);
        let result = runner.run(&spec, config.query_timeout()).await;
        tracing::info!(query = kind, success = result.success, "collection query finished");
        logs.push(QueryRecord {
            kind: kind.to_string(),
            description: description.to_string(),
            result,
        });
    }

    step(out, 4, "Checking service status")?;
    let service_status = run_probe(runner, &service_probe(config), config, out).await?;
    step(out, 5, "Checking Pub/Sub subscriptions")?;
    let pubsub = run_probe(runner, &pubsub_probe(config), config, out).await?;

    Ok(CollectedLogs {
        timestamp,
        logs,
        service_status: Some(service_status),
        pubsub: Some(pubsub),
    })
}

fn rule() -> String {
    "=".repeat(SUMMARY_RULE_WIDTH)
}

fn write_entry(text: &mut String, n: usize, entry: &LogEntry) {
    let _ = writeln!(text, "\n--- Entry {n} ---");
    if let Some(payload) = &entry.text_payload {
        let _ = writeln!(text, "Text: {payload}");
    }
    if let Some(json) = &entry.json_payload {
        let pretty = serde_json::to_string_pretty(json).unwrap_or_default();
        let _ = writeln!(text, "JSON: {pretty}");
    }
    if let Some(ts) = &entry.timestamp {
        let _ = writeln!(text, "Timestamp: {ts}");
    }
    if let Some(severity) = entry.severity {
        let _ = writeln!(text, "Severity: {severity}");
    }
}

impl CollectedLogs {
    /// Human-readable summary written next to the JSON.
    pub fn summary(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "=== DIAGNOSIS: WHY EMAILS ARE NOT PROCESSED ===");
        let _ = writeln!(text, "Generated: {}\n", self.timestamp);

        for record in &self.logs {
            let _ = writeln!(text, "\n{}\n{}\n{}", rule(), record.description, rule());
            let result = &record.result;
            if !result.success {
                let _ = writeln!(text, "Error: {}", result.error);
                continue;
            }
            if result.output.is_empty() {
                let _ = writeln!(text, "No entries in this period");
                continue;
            }
            match FetchOutcome::from_exec(result.clone()) {
                FetchOutcome::Entries(entries) => {
                    let _ = writeln!(text, "Entries found: {}\n", entries.len());
                    for (i, entry) in entries.iter().take(SUMMARY_ENTRIES).enumerate() {
                        write_entry(&mut text, i + 1, entry);
                    }
                }
                _ => {
                    let _ = writeln!(text, "{}", preview(&result.output, RAW_PREVIEW_CHARS));
                }
            }
        }

        let _ = writeln!(text, "\n\n{}\nSERVICE STATUS\n{}", rule(), rule());
        match &self.service_status {
            Some(service) if service.success => {
                let _ = writeln!(text, "Service reachable");
                if !service.output.is_empty() {
                    match ServiceHealth::from_describe_json(&service.output) {
                        Ok(health) => {
                            let _ = writeln!(text, "State: {}", health.ready);
                            let _ = writeln!(text, "Latest revision: {}", health.latest_revision);
                            if let Some(url) = &health.url {
                                let _ = writeln!(text, "URL: {url}");
                            }
                        }
                        Err(_) => {
                            let _ = writeln!(text, "{}", preview(&service.output, 500));
                        }
                    }
                }
            }
            Some(service) => {
                let _ = writeln!(text, "Error fetching status: {}", service.error);
            }
            None => {
                let _ = writeln!(text, "Not checked");
            }
        }
        text
    }
}

pub async fn run(
    runner: &dyn CommandRunner,
    config: &DiagConfig,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    writeln!(out, "\n=== Collecting Cloud Run logs ===")?;
    writeln!(out, "Looking for email processing activity...\n")?;

    let collected = collect(runner, config, now_timestamp(), out).await?;

    let writer = ReportWriter::new(&config.output_dir);
    let json_path = writer
        .write_json(COLLECTED_FILE, &collected)
        .context("saving collected logs")?;
    writeln!(out, "\nLogs saved to: {}", json_path.display())?;
    let summary_path = writer
        .write_text(SUMMARY_FILE, &collected.summary())
        .context("saving log summary")?;
    writeln!(out, "Summary saved to: {}", summary_path.display())?;
    Ok(())
}
