//! E2E tests for the console subcommands (errors, emails, logs).

mod helpers;

use helpers::TestHarness;
use lgd_log_tools::{LogEntry, Severity};

/// The errors report classifies the sample into every subsystem.
#[tokio::test]
async fn e2e_errors_report_on_sample() {
    let h = TestHarness::with_sample_data();
    let text = h.errors().await;

    assert!(text.contains("Total entries: 8"));
    assert!(text.contains("Errors: 2"));
    assert!(text.contains("Found 2 Airtable entries"));
    assert!(text.contains("Error creando registro"));
    assert!(text.contains("DIAGNOSIS COMPLETE"));
}

/// An empty log window is reported, never an error.
#[tokio::test]
async fn e2e_empty_window() {
    let h = TestHarness::with_entries(&[]);

    let errors = h.errors().await;
    assert!(errors.contains("No recent errors"));
    assert!(errors.contains("Total entries: 0"));
    assert!(errors.contains("No Pub/Sub entries found"));

    let emails = h.emails().await;
    assert!(emails.contains("[1] Found 0 email-related entries"));
    assert!(emails.contains("No successful send entries found"));

    let logs = h.logs().await;
    assert!(logs.contains("Found 0 entries"));
}

/// A JSON-payload send confirmation counts as a successful send.
#[tokio::test]
async fn e2e_emails_detects_json_payload_success() {
    let entries = vec![
        LogEntry::json(
            "2024-01-15T09:00:02Z",
            Severity::Info,
            serde_json::json!({"msg": "Email de lead enviado exitosamente"}),
        ),
        LogEntry::text("2024-01-15T09:00:01Z", Severity::Info, "EMAIL_TO=ventas@example.com"),
    ];
    let h = TestHarness::with_entries(&entries);
    let text = h.emails().await;

    assert!(text.contains("[1] Found 2 email-related entries"));
    assert!(text.contains("Found 1 successful sends"));
    assert!(text.contains("EMAIL_TO=ventas@example.com"));
}

/// Errors spelled only in Spanish count toward the error total.
#[tokio::test]
async fn e2e_errors_counts_fallo() {
    let entries = vec![
        LogEntry::text("2024-01-15T09:00:02Z", Severity::Info, "[airtable] fallo al crear"),
        LogEntry::text("2024-01-15T09:00:01Z", Severity::Info, "[airtable] Registro creado"),
    ];
    let h = TestHarness::with_entries(&entries);
    let text = h.errors().await;

    assert!(text.contains("Errors: 1"));
    assert!(text.contains("    Succeeded: 1"));
    assert!(text.contains("    Failed: 1"));
}

/// Unknown severities and odd payloads do not break the logs view.
#[tokio::test]
async fn e2e_logs_tolerates_odd_entries() {
    let mut runner = lgd_diagnostics::mock::MockRunner::new();
    runner.on_prefix(
        "gcloud logging read",
        lgd_diagnostics::runner::ExecResult::ok(
            r#"[{"severity":"LOUD","textPayload":42}, "junk", {"timestamp":"2024-01-15T09:00:00Z"}]"#,
        ),
    );
    let h = TestHarness::with_runner(runner);
    let text = h.logs().await;

    assert!(text.contains("Found 2 entries"));
    assert!(text.contains("[1] N/A [N/A]"));
    assert!(text.contains("[2] 2024-01-15T09:00:00Z [N/A]"));
}
