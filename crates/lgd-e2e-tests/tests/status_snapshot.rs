//! E2E tests for the status snapshot and its persisted files.

mod helpers;

use helpers::TestHarness;
use lgd_diagnostics::commands::status::{STATUS_FILE, SUMMARY_FILE};
use lgd_diagnostics::mock::MockRunner;
use lgd_diagnostics::runner::ExecResult;

/// Every probe is recorded and summarized.
#[tokio::test]
async fn e2e_status_snapshot() {
    let h = TestHarness::with_sample_data();
    let printed = h.status().await;
    assert!(printed.contains("[Repository]"));

    let json: serde_json::Value = serde_json::from_str(&h.read_output(STATUS_FILE)).unwrap();
    assert_eq!(json["gcloud"].as_object().unwrap().len(), 6);
    assert_eq!(json["github"].as_object().unwrap().len(), 4);
    assert!(json["timestamp"].is_string());

    let summary = h.read_output(SUMMARY_FILE);
    assert!(summary.contains("=== STATUS SUMMARY ==="));
    assert!(summary.contains("- Project: check-in-sf"));
    assert!(summary.contains("- Last 5 commits: OK"));
}

/// Missing tools show up as failed probes with exit code -1.
#[tokio::test]
async fn e2e_status_without_tools() {
    let h = TestHarness::with_runner(MockRunner::new());
    h.status().await;

    let json: serde_json::Value = serde_json::from_str(&h.read_output(STATUS_FILE)).unwrap();
    assert_eq!(json["gcloud"]["builds"]["success"], false);
    assert_eq!(json["gcloud"]["builds"]["exitCode"], -1);
    assert_eq!(json["github"]["remote"]["exitCode"], -1);

    let summary = h.read_output(SUMMARY_FILE);
    assert!(summary.contains("- Project: Error"));
    assert!(summary.contains("- Remote connectivity: Error"));
}

/// A partially failing environment is summarized per probe.
#[tokio::test]
async fn e2e_status_mixed_results() {
    let mut runner = MockRunner::new();
    runner.on_prefix("gcloud builds", ExecResult::failed(1, "PERMISSION_DENIED"));
    runner.on_prefix("gcloud", ExecResult::ok("check-in-sf"));
    runner.on_prefix("git", ExecResult::ok(""));
    let h = TestHarness::with_runner(runner);
    h.status().await;

    let summary = h.read_output(SUMMARY_FILE);
    assert!(summary.contains("- Recent builds: Error"));
    assert!(summary.contains("- Build triggers: Error"));
    assert!(summary.contains("- Cloud Run service: OK"));
    assert!(summary.contains("- Configured remote: OK"));
}
