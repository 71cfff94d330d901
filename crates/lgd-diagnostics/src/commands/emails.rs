//! `lgd emails`: is the pipeline actually sending lead emails?

use std::io::Write;

use lgd_log_tools::{classify, error_category};

use crate::commands::{list_entries, report_fetch_problem};
use crate::config::{DiagConfig, category};
use crate::query::{LogQuery, fetch_entries};
use crate::render::{banner, entry_line};
use crate::runner::CommandRunner;

/// Case-sensitive markers of the email sender's own log lines.
pub const EMAIL_MARKERS: &[&str] = &[
    "sendLeadEmail",
    "Email de lead enviado",
    "ERROR enviando email",
    "EMAIL_FROM",
    "EMAIL_TO",
];

pub async fn run(
    runner: &dyn CommandRunner,
    config: &DiagConfig,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    banner(out, "EMAIL DELIVERY CHECK")?;

    let query = LogQuery::for_service(config).limit(100);
    let outcome = fetch_entries(runner, &query, config).await;
    report_fetch_problem(out, &outcome)?;
    let entries = outcome.entries();

    let report = classify(entries, &config.categories_named(&[category::EMAIL]));
    let errors = error_category(entries);
    let email = report.category(category::EMAIL);
    let email_entries = report.entries(category::EMAIL);

    writeln!(out, "[1] Found {} email-related entries", email_entries.len())?;
    writeln!(out, "[2] Found {} error entries\n", errors.len())?;

    if !email_entries.is_empty() {
        banner(out, "EMAIL LOGS (most recent)")?;
        let marked: Vec<_> = email_entries
            .iter()
            .take(20)
            .copied()
            .filter(|e| {
                let text = e.combined_text();
                EMAIL_MARKERS.iter().any(|m| text.contains(m))
            })
            .collect();
        for entry in marked {
            writeln!(out, "  {}\n", entry_line(entry, 200))?;
        }
    }

    if !errors.is_empty() {
        banner(out, "RECENT ERRORS")?;
        for entry in errors.iter().take(10) {
            writeln!(out, "  {}\n", entry_line(entry, 300))?;
        }
    }

    banner(out, "SUCCESSFUL SENDS")?;
    let sent = email
        .and_then(|c| c.success.as_deref())
        .unwrap_or_default();
    if sent.is_empty() {
        writeln!(out, "  ! No successful send entries found")?;
        writeln!(out, "  This may mean that:")?;
        writeln!(out, "  - emails are not being sent")?;
        writeln!(out, "  - the send step is failing")?;
        writeln!(out, "  - the entries have not shown up yet")?;
    } else {
        writeln!(out, "  Found {} successful sends", sent.len())?;
        list_entries(out, sent, 5, 150)?;
    }
    let failed = email
        .and_then(|c| c.failure.as_deref())
        .unwrap_or_default();
    if !failed.is_empty() {
        writeln!(out, "\n  Send failures: {}", failed.len())?;
        list_entries(out, failed, 5, 150)?;
    }
    Ok(())
}
