//! Shared test harness for E2E integration tests.
//!
//! Runs the real subcommands against a `MockRunner` and a scratch output
//! directory, capturing what they print.

#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

use lgd_diagnostics::commands;
use lgd_diagnostics::config::DiagConfig;
use lgd_diagnostics::mock::MockRunner;
use lgd_diagnostics::runner::ExecResult;
use lgd_log_tools::LogEntry;

/// Subcommand harness with its own output directory.
pub struct TestHarness {
    pub config: DiagConfig,
    pub runner: MockRunner,
    /// Kept alive so the output directory outlives the harness' use.
    _dir: TempDir,
}

impl TestHarness {
    /// Every log query answers with the sample Cloud Run output.
    pub fn with_sample_data() -> Self {
        Self::with_runner(MockRunner::with_cloud_run_sample())
    }

    /// Log queries answer with `entries`; other commands as in the sample.
    pub fn with_entries(entries: &[LogEntry]) -> Self {
        let mut runner = MockRunner::new();
        runner.on_prefix(
            "gcloud logging read",
            ExecResult::ok(serde_json::to_string(entries).unwrap()),
        );
        runner.on_prefix("gcloud", ExecResult::ok("[]"));
        runner.on_prefix("git", ExecResult::ok(""));
        Self::with_runner(runner)
    }

    pub fn with_runner(runner: MockRunner) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = DiagConfig {
            output_dir: dir.path().join("auto_logs"),
            ..DiagConfig::default()
        };
        Self {
            config,
            runner,
            _dir: dir,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    pub fn read_output(&self, name: &str) -> String {
        std::fs::read_to_string(self.output_dir().join(name)).unwrap()
    }

    pub async fn errors(&self) -> String {
        let mut out = Vec::new();
        commands::errors::run(&self.runner, &self.config, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    pub async fn emails(&self) -> String {
        let mut out = Vec::new();
        commands::emails::run(&self.runner, &self.config, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    pub async fn logs(&self) -> String {
        let mut out = Vec::new();
        commands::logs::run(&self.runner, &self.config, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    pub async fn collect(&self) -> String {
        let mut out = Vec::new();
        commands::collect::run(&self.runner, &self.config, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    /// `Err` carries the full error chain as text.
    pub fn analyze(&self) -> Result<String, String> {
        let mut out = Vec::new();
        commands::analyze::run(None, &self.config, &mut out).map_err(|e| format!("{e:#}"))?;
        Ok(String::from_utf8(out).unwrap())
    }

    pub async fn status(&self) -> String {
        let mut out = Vec::new();
        commands::status::run(&self.runner, &self.config, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }
}
