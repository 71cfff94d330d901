//! `lgd logs`: run one log query and show what came back, raw details included.

use std::io::Write;

use lgd_log_tools::{LogStats, parse_entries};

use crate::commands::RAW_PREVIEW_CHARS;
use crate::config::DiagConfig;
use crate::query::LogQuery;
use crate::render::{banner, preview, severity_label};
use crate::runner::CommandRunner;

pub async fn run(
    runner: &dyn CommandRunner,
    config: &DiagConfig,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    banner(out, "CLOUD RUN LOGS")?;

    let query = LogQuery::for_service(config).limit(30).freshness("1h");
    let spec = query.to_command(&config.project_id);
    writeln!(out, "Command: {}\n", spec.command_line())?;

    let result = runner.run(&spec, config.query_timeout()).await;
    writeln!(out, "Exit code: {}", result.exit_code)?;
    writeln!(out, "Stdout length: {}", result.output.len())?;
    writeln!(out, "Stderr length: {}\n", result.error.len())?;

    if !result.output.is_empty() {
        match parse_entries(&result.output) {
            Ok(entries) => {
                let stats = LogStats::compute(&entries);
                writeln!(out, "Found {} entries", stats.total)?;
                if let (Some(earliest), Some(latest)) = (&stats.earliest, &stats.latest) {
                    writeln!(out, "Time range: {earliest} .. {latest}")?;
                }
                let counts: Vec<String> = stats
                    .by_severity
                    .iter()
                    .rev()
                    .map(|(severity, n)| format!("{severity}={n}"))
                    .collect();
                writeln!(out, "By severity: {}\n", counts.join(" "))?;
                for (i, entry) in entries.iter().take(10).enumerate() {
                    writeln!(
                        out,
                        "[{}] {} [{}]",
                        i + 1, entry.timestamp.as_deref().unwrap_or("N/A"), severity_label(entry)
                    )?;
                    let text = entry.display_text();
                    writeln!(out, "    {}\n", preview(&text, config.preview_chars))?;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "log output is not a JSON array");
                writeln!(out, "Output is not valid JSON ({e}):")?;
                writeln!(out, "{}\n", preview(&result.output, RAW_PREVIEW_CHARS))?;
            }
        }
    }

    if !result.error.is_empty() {
        writeln!(out, "Stderr:")?;
        writeln!(out, "{}", preview(&result.error, RAW_PREVIEW_CHARS))?;
    }
    if let Err(e) = result.into_result() {
        tracing::warn!(error = %e, "log query did not succeed");
        writeln!(out, "\nQuery did not succeed: {e}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;
    use crate::runner::ExecResult;

    async fn render(runner: &MockRunner) -> String {
        let mut out = Vec::new();
        run(runner, &DiagConfig::default(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn lists_entries_with_severity() {
        let runner = MockRunner::with_cloud_run_sample();
        let text = render(&runner).await;
        assert!(text.contains("Command: gcloud logging read"));
        assert!(text.contains("--limit=30"));
        assert!(text.contains("Exit code: 0"));
        assert!(text.contains("Found 8 entries"));
        assert!(text.contains("Time range: 2024-01-15T12:00:05Z .. 2024-01-15T12:00:40Z"));
        assert!(text.contains("By severity: ERROR=2 WARNING=1 INFO=4 DEFAULT=1"));
        assert!(text.contains("[1] 2024-01-15T12:00:40Z [ERROR]"));
        assert!(text.contains("[8] 2024-01-15T12:00:05Z [DEFAULT]"));
        assert!(!text.contains("Stderr:"));
        assert!(!text.contains("did not succeed"));
    }

    #[tokio::test]
    async fn malformed_output_is_shown_raw() {
        let mut runner = MockRunner::new();
        runner.on_prefix("gcloud", ExecResult::ok("Listed 0 items."));
        let text = render(&runner).await;
        assert!(text.contains("Output is not valid JSON"));
        assert!(text.contains("Listed 0 items."));
    }

    #[tokio::test]
    async fn raw_output_is_truncated() {
        let mut runner = MockRunner::new();
        runner.on_prefix("gcloud", ExecResult::ok("x".repeat(5000)));
        let text = render(&runner).await;
        assert!(text.contains(&"x".repeat(RAW_PREVIEW_CHARS)));
        assert!(!text.contains(&"x".repeat(RAW_PREVIEW_CHARS + 1)));
    }

    #[tokio::test]
    async fn stderr_is_always_printed() {
        let mut runner = MockRunner::new();
        runner.on_prefix("gcloud", ExecResult::failed(2, "ERROR: invalid filter"));
        let text = render(&runner).await;
        assert!(text.contains("Exit code: 2"));
        assert!(text.contains("Stderr:\nERROR: invalid filter"));
        assert!(text.contains("Query did not succeed: exited with code 2: ERROR: invalid filter"));
    }

    #[tokio::test]
    async fn timeout_is_named() {
        let mut runner = MockRunner::new();
        runner.on_prefix("gcloud", ExecResult::timeout(std::time::Duration::from_secs(60)));
        let text = render(&runner).await;
        assert!(text.contains("Exit code: -1"));
        assert!(text.contains("Query did not succeed: timed out after 60s"));
    }
}
