//! Mock command runner for testing without `gcloud` or `git` installed.
//!
//! Serves canned results by command line and records every invocation.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::runner::{CommandRunner, CommandSpec, ExecResult};

/// A mock runner that answers from pre-loaded results.
///
/// Lookup order: exact command line, then the first registered prefix.
/// Anything else fails as if the program were not installed.
pub struct MockRunner {
    exact: Vec<(String, ExecResult)>,
    prefixes: Vec<(String, ExecResult)>,
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            exact: Vec::new(),
            prefixes: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer `spec` (matched by its command line) with `result`.
    pub fn on(&mut self, spec: &CommandSpec, result: ExecResult) -> &mut Self {
        self.exact.push((spec.command_line(), result));
        self
    }

    /// Answer every command line starting with `prefix` with `result`.
    pub fn on_prefix(&mut self, prefix: impl Into<String>, result: ExecResult) -> &mut Self {
        self.prefixes.push((prefix.into(), result));
        self
    }

    /// A runner where every `gcloud logging read` returns the sample service log
    /// and every other `gcloud`/`git` command succeeds with `{}`.
    pub fn with_cloud_run_sample() -> Self {
        let mut m = Self::new();
        m.on_prefix(
            "gcloud logging read",
            ExecResult::ok(lgd_log_tools::fixtures::CLOUD_RUN_SAMPLE_JSON),
        );
        m.on_prefix("gcloud run services describe", ExecResult::ok(SERVICE_DESCRIBE_SAMPLE));
        m.on_prefix("gcloud config get-value project", ExecResult::ok("check-in-sf"));
        m.on_prefix("gcloud", ExecResult::ok("[]"));
        m.on_prefix("git", ExecResult::ok(""));
        m
    }

    /// Command lines run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls whose command line starts with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, spec: &CommandSpec, _timeout: Duration) -> ExecResult {
        let line = spec.command_line();
        self.calls.lock().unwrap().push(line.clone());

        self.exact
            .iter()
            .find(|(l, _)| *l == line)
            .or_else(|| self.prefixes.iter().find(|(p, _)| line.starts_with(p.as_str())))
            .map(|(_, r)| r.clone())
            .unwrap_or_else(|| ExecResult::spawn_failure(format!("{}: not found", spec.program)))
    }
}

/// Trimmed `gcloud run services describe --format=json` output.
pub const SERVICE_DESCRIBE_SAMPLE: &str = r#"{
  "apiVersion": "serving.knative.dev/v1",
  "kind": "Service",
  "metadata": {"name": "mfs-lead-generation-ai"},
  "status": {
    "conditions": [
      {"type": "Ready", "status": "True"},
      {"type": "ConfigurationsReady", "status": "True"}
    ],
    "latestReadyRevisionName": "mfs-lead-generation-ai-00042-xyz",
    "url": "https://mfs-lead-generation-ai-abc-uc.a.run.app"
  }
}"#;
