//! Service and repository status probes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::DiagConfig;
use crate::runner::{CommandRunner, CommandSpec, ExecResult};

/// One status command and the key its result is stored under.
#[derive(Debug, Clone)]
pub struct Probe {
    pub key: &'static str,
    pub label: &'static str,
    pub spec: CommandSpec,
}

impl Probe {
    fn new(key: &'static str, label: &'static str, program: &str, args: Vec<String>) -> Self {
        Self {
            key,
            label,
            spec: CommandSpec::new(program, args).with_description(label),
        }
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| (*a).to_string()).collect()
}

/// `gcloud` probes for the configured project and service.
pub fn cloud_probes(config: &DiagConfig) -> Vec<Probe> {
    let project = format!("--project={}", config.project_id);
    let region = format!("--region={}", config.region);
    let service = config.service_name.as_str();
    vec![
        Probe::new(
            "project",
            "Current project",
            "gcloud",
            owned(&["config", "get-value", "project"]),
        ),
        Probe::new(
            "builds",
            "Recent builds",
            "gcloud",
            owned(&[
                "builds",
                "list",
                project.as_str(),
                "--limit=5",
                "--format=json",
            ]),
        ),
        Probe::new(
            "ongoing",
            "Builds in progress",
            "gcloud",
            owned(&[
                "builds",
                "list",
                project.as_str(),
                "--ongoing",
                "--format=json",
            ]),
        ),
        Probe::new(
            "triggers",
            "Build triggers",
            "gcloud",
            owned(&[
                "builds",
                "triggers",
                "list",
                project.as_str(),
                "--format=json",
            ]),
        ),
        service_probe(config),
        Probe::new(
            "revisions",
            "Recent revisions",
            "gcloud",
            owned(&[
                "run",
                "revisions",
                "list",
                format!("--service={service}").as_str(),
                region.as_str(),
                project.as_str(),
                "--limit=3",
                "--format=json",
            ]),
        ),
    ]
}

/// `gcloud run services describe` for the configured service.
pub fn service_probe(config: &DiagConfig) -> Probe {
    Probe::new(
        "service",
        "Cloud Run service",
        "gcloud",
        owned(&[
            "run",
            "services",
            "describe",
            config.service_name.as_str(),
            format!("--region={}", config.region).as_str(),
            format!("--project={}", config.project_id).as_str(),
            "--format=json",
        ]),
    )
}

/// Pub/Sub subscriptions of the project.
pub fn pubsub_probe(config: &DiagConfig) -> Probe {
    Probe::new(
        "pubsub",
        "Pub/Sub subscriptions",
        "gcloud",
        owned(&[
            "pubsub",
            "subscriptions",
            "list",
            format!("--project={}", config.project_id).as_str(),
            "--format=json",
        ]),
    )
}

/// `git` probes, run in the runner's working directory.
pub fn repo_probes() -> Vec<Probe> {
    vec![
        Probe::new("remote", "Configured remote", "git", owned(&["remote", "-v"])),
        Probe::new("status", "Repository status", "git", owned(&["status"])),
        Probe::new("log", "Last 5 commits", "git", owned(&["log", "--oneline", "-5"])),
        Probe::new(
            "connection",
            "Remote connectivity",
            "git",
            owned(&["ls-remote", "origin", "HEAD"]),
        ),
    ]
}

// ── Report ────────────────────────────────────────────────────

/// Results of every probe, keyed by probe key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub timestamp: String,
    pub gcloud: BTreeMap<String, ExecResult>,
    pub github: BTreeMap<String, ExecResult>,
}

/// Run one probe, printing `  -> label...` first.
pub async fn run_probe(
    runner: &dyn CommandRunner,
    probe: &Probe,
    config: &DiagConfig,
    out: &mut dyn std::io::Write,
) -> std::io::Result<ExecResult> {
    writeln!(out, "  -> {}...", probe.label)?;
    let result = runner.run(&probe.spec, config.query_timeout()).await;
    tracing::info!(probe = probe.key, success = result.success, "probe finished");
    Ok(result)
}

async fn run_probes(
    runner: &dyn CommandRunner,
    probes: &[Probe],
    config: &DiagConfig,
    out: &mut dyn std::io::Write,
) -> std::io::Result<BTreeMap<String, ExecResult>> {
    let mut results = BTreeMap::new();
    for probe in probes {
        let result = run_probe(runner, probe, config, out).await?;
        results.insert(probe.key.to_string(), result);
    }
    Ok(results)
}

/// Run all cloud and repository probes sequentially, printing progress.
pub async fn collect_status(
    runner: &dyn CommandRunner,
    config: &DiagConfig,
    timestamp: String,
    out: &mut dyn std::io::Write,
) -> std::io::Result<StatusReport> {
    writeln!(out, "\n[Google Cloud]")?;
    let gcloud = run_probes(runner, &cloud_probes(config), config, out).await?;
    writeln!(out, "\n[Repository]")?;
    let github = run_probes(runner, &repo_probes(), config, out).await?;
    Ok(StatusReport {
        timestamp,
        gcloud,
        github,
    })
}

impl StatusReport {
    /// Plain-text summary: one OK/Error line per probe.
    pub fn summary(&self, config: &DiagConfig) -> String {
        let mut text = String::new();
        text.push_str("=== STATUS SUMMARY ===\n");
        text.push_str(&format!("Generated: {}\n\n", self.timestamp));

        text.push_str("GOOGLE CLOUD:\n");
        let project_result = self.gcloud.get("project").cloned();
        let project = match project_result.map(ExecResult::into_result) {
            Some(Ok(project)) => project,
            Some(Err(e)) => format!("Error ({e})"),
            None => "Error".to_string(),
        };
        text.push_str(&format!("- Project: {project}\n"));
        for probe in cloud_probes(config).iter().filter(|p| p.key != "project") {
            let status = ok_or_error(self.gcloud.get(probe.key));
            text.push_str(&format!("- {}: {status}\n", probe.label));
        }

        text.push_str("\nREPOSITORY:\n");
        for probe in repo_probes() {
            let status = ok_or_error(self.github.get(probe.key));
            text.push_str(&format!("- {}: {status}\n", probe.label));
        }
        text
    }
}

fn ok_or_error(result: Option<&ExecResult>) -> &'static str {
    match result {
        Some(r) if r.success => "OK",
        _ => "Error",
    }
}

// ── Service health ────────────────────────────────────────────

/// Readiness extracted from `gcloud run services describe --format=json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    /// `status` of the first condition (usually `Ready`).
    pub ready: String,
    pub latest_revision: String,
    pub url: Option<String>,
}

impl ServiceHealth {
    /// Missing parts default to `Unknown`; unparseable JSON is an error.
    pub fn from_describe_json(text: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let status = &value["status"];
        Ok(Self {
            ready: status["conditions"][0]["status"]
                .as_str()
                .unwrap_or("Unknown")
                .to_string(),
            latest_revision: status["latestReadyRevisionName"]
                .as_str()
                .unwrap_or("Unknown")
                .to_string(),
            url: status["url"].as_str().map(String::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockRunner, SERVICE_DESCRIBE_SAMPLE};

    #[test]
    fn cloud_probe_commands() {
        let probes = cloud_probes(&DiagConfig::default());
        let lines: Vec<_> = probes.iter().map(|p| p.spec.command_line()).collect();
        assert!(lines.contains(&"gcloud config get-value project".to_string()));
        let describe = concat!(
            "gcloud run services describe mfs-lead-generation-ai ",
            "--region=us-central1 --project=check-in-sf --format=json"
        );
        assert!(lines.iter().any(|l| l == describe));
        assert!(lines.contains(
            &"gcloud builds list --project=check-in-sf --ongoing --format=json".to_string()
        ));
    }

    #[test]
    fn repo_probe_commands() {
        let lines: Vec<_> = repo_probes()
            .iter()
            .map(|p| p.spec.command_line())
            .collect();
        assert_eq!(
            lines,
            vec![
                "git remote -v",
                "git status",
                "git log --oneline -5",
                "git ls-remote origin HEAD"
            ]
        );
    }

    #[test]
    fn pubsub_probe_command() {
        let probe = pubsub_probe(&DiagConfig::default());
        assert_eq!(
            probe.spec.command_line(),
            "gcloud pubsub subscriptions list --project=check-in-sf --format=json"
        );
    }

    #[test]
    fn service_health_from_sample() {
        let health = ServiceHealth::from_describe_json(SERVICE_DESCRIBE_SAMPLE).unwrap();
        assert_eq!(health.ready, "True");
        assert_eq!(health.latest_revision, "mfs-lead-generation-ai-00042-xyz");
        assert!(health.url.is_some());
    }

    #[test]
    fn service_health_defaults_unknown() {
        let health = ServiceHealth::from_describe_json("{}").unwrap();
        assert_eq!(health.ready, "Unknown");
        assert_eq!(health.latest_revision, "Unknown");
        assert!(health.url.is_none());
        assert!(ServiceHealth::from_describe_json("not json").is_err());
    }

    #[tokio::test]
    async fn collect_status_runs_every_probe() {
        let config = DiagConfig::default();
        let runner = MockRunner::with_cloud_run_sample();
        let mut out = Vec::new();
        let report = collect_status(&runner, &config, "2024-01-15 12:00:00".into(), &mut out)
            .await
            .unwrap();
        assert_eq!(report.gcloud.len(), 6);
        assert_eq!(report.github.len(), 4);
        assert_eq!(runner.calls().len(), 10);
        assert_eq!(report.gcloud["project"].output, "check-in-sf");
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("-> Recent builds..."));
    }

    #[tokio::test]
    async fn summary_marks_failures() {
        let config = DiagConfig::default();
        let mut runner = MockRunner::new();
        runner.on_prefix("gcloud", ExecResult::ok("check-in-sf"));
        runner.on_prefix("git status", ExecResult::ok("clean"));
        let mut out = Vec::new();
        let report = collect_status(&runner, &config, "ts".into(), &mut out)
            .await
            .unwrap();
        let summary = report.summary(&config);
        assert!(summary.contains("- Project: check-in-sf"));
        assert!(summary.contains("- Recent builds: OK"));
        assert!(summary.contains("- Repository status: OK"));
        assert!(summary.contains("- Configured remote: Error"));
    }

    #[tokio::test]
    async fn summary_explains_project_failure() {
        let config = DiagConfig::default();
        let mut runner = MockRunner::new();
        runner.on(
            &CommandSpec::new("gcloud", ["config", "get-value", "project"]),
            ExecResult::timeout(std::time::Duration::from_secs(60)),
        );
        let mut out = Vec::new();
        let report = collect_status(&runner, &config, "ts".into(), &mut out)
            .await
            .unwrap();
        let summary = report.summary(&config);
        assert!(summary.contains("- Project: Error (timed out after 60s)"));
        assert!(summary.contains("- Recent builds: Error"));
    }
}
