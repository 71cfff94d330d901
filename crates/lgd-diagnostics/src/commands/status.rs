//! `lgd status`: cloud and repository status snapshot.

use std::io::Write;

use anyhow::Context;

use crate::commands::now_timestamp;
use crate::config::DiagConfig;
use crate::report::ReportWriter;
use crate::runner::CommandRunner;
use crate::status::collect_status;

pub const STATUS_FILE: &str = "status.json";
pub const SUMMARY_FILE: &str = "summary.txt";

pub async fn run(
    runner: &dyn CommandRunner,
    config: &DiagConfig,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    writeln!(out, "\n=== Collecting status ===")?;
    writeln!(out, "Output directory: {}", config.output_dir.display())?;

    let report = collect_status(runner, config, now_timestamp(), out).await?;

    let writer = ReportWriter::new(&config.output_dir);
    let json_path = writer
        .write_json(STATUS_FILE, &report)
        .context("saving status report")?;
    writeln!(out, "\nStatus saved to: {}", json_path.display())?;
    let summary_path = writer
        .write_text(SUMMARY_FILE, &report.summary(config))
        .context("saving status summary")?;
    writeln!(out, "Summary saved to: {}", summary_path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;

    #[tokio::test]
    async fn writes_status_and_summary() {
        let tmp = tempfile::tempdir().unwrap();
        let config = DiagConfig {
            output_dir: tmp.path().join("auto_logs"),
            ..DiagConfig::default()
        };
        let runner = MockRunner::with_cloud_run_sample();
        let mut out = Vec::new();
        run(&runner, &config, &mut out).await.unwrap();

        let json = std::fs::read_to_string(config.output_dir.join(STATUS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["gcloud"]["project"]["output"], "check-in-sf");
        assert_eq!(value["github"]["status"]["exitCode"], 0);

        let summary = std::fs::read_to_string(config.output_dir.join(SUMMARY_FILE)).unwrap();
        assert!(summary.contains("- Project: check-in-sf"));
        assert!(summary.contains("- Cloud Run service: OK"));

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("[Google Cloud]"));
        assert!(printed.contains("Status saved to:"));
    }

    #[tokio::test]
    async fn unwritable_output_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let config = DiagConfig {
            output_dir: blocker.join("sub"),
            ..DiagConfig::default()
        };
        let runner = MockRunner::with_cloud_run_sample();
        let mut out = Vec::new();
        let err = run(&runner, &config, &mut out).await.unwrap_err();
        assert!(format!("{err:#}").contains("saving status report"));
    }
}
