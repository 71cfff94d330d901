//! Cloud Logging query builder and the fetch-and-parse step.

use lgd_log_tools::{LogEntry, Severity, parse_entries};

use crate::config::DiagConfig;
use crate::runner::{CommandRunner, CommandSpec, ExecResult};

/// Parameters of one `gcloud logging read` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub resource_type: String,
    pub service_name: String,
    /// `severity>=X` clause.
    pub min_severity: Option<Severity>,
    /// `(severity="A" OR severity="B")` clause.
    pub severities: Vec<Severity>,
    /// `textPayload=~"..."` regex clauses, OR-ed together.
    pub text_patterns: Vec<String>,
    pub limit: usize,
    /// Trailing window such as `1h` or `2h`.
    pub freshness: Option<String>,
}

impl LogQuery {
    /// All entries of the configured service, 100 at most, no window.
    pub fn for_service(config: &DiagConfig) -> Self {
        Self {
            resource_type: config.resource_type.clone(),
            service_name: config.service_name.clone(),
            min_severity: None,
            severities: Vec::new(),
            text_patterns: Vec::new(),
            limit: 100,
            freshness: None,
        }
    }

    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    pub fn any_severity(mut self, severities: &[Severity]) -> Self {
        self.severities = severities.to_vec();
        self
    }

    pub fn text_matching(mut self, patterns: &[&str]) -> Self {
        self.text_patterns = patterns.iter().map(|p| (*p).to_string()).collect();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn freshness(mut self, window: impl Into<String>) -> Self {
        self.freshness = Some(window.into());
        self
    }

    /// Render the Cloud Logging filter expression.
    pub fn filter(&self) -> String {
        let mut clauses = vec![
            format!("resource.type=\"{}\"", escape(&self.resource_type)),
            format!(
                "resource.labels.service_name=\"{}\"",
                escape(&self.service_name)
            ),
        ];

        if let Some(min) = self.min_severity {
            clauses.push(format!("severity>={min}"));
        }
        if !self.severities.is_empty() {
            let alternatives: Vec<String> = self
                .severities
                .iter()
                .map(|s| format!("severity=\"{s}\""))
                .collect();
            clauses.push(any_of(alternatives));
        }
        if !self.text_patterns.is_empty() {
            let alternatives: Vec<String> = self
                .text_patterns
                .iter()
                .map(|p| format!("textPayload=~\"{}\"", escape(p)))
                .collect();
            clauses.push(any_of(alternatives));
        }

        clauses.join(" AND ")
    }

    /// The `gcloud logging read` invocation for `project_id`.
    pub fn to_command(&self, project_id: &str) -> CommandSpec {
        let mut args = vec![
            "logging".to_string(),
            "read".to_string(),
            self.filter(),
            format!("--project={project_id}"),
            format!("--limit={}", self.limit),
            "--format=json".to_string(),
        ];
        if let Some(window) = &self.freshness {
            args.push(format!("--freshness={window}"));
        }
        CommandSpec::new("gcloud", args)
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn any_of(mut alternatives: Vec<String>) -> String {
    if alternatives.len() == 1 {
        alternatives.remove(0)
    } else {
        format!("({})", alternatives.join(" OR "))
    }
}

// ── Fetching ──────────────────────────────────────────────────

/// Outcome of running a log query and parsing its output.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Entries(Vec<LogEntry>),
    /// The command did not succeed.
    Failed(ExecResult),
    /// The command succeeded but printed something that is not a log array.
    Malformed { error: String, raw: String },
}

impl FetchOutcome {
    /// Interpret a finished command.
    pub fn from_exec(result: ExecResult) -> Self {
        if !result.success {
            return Self::Failed(result);
        }
        match parse_entries(&result.output) {
            Ok(entries) => Self::Entries(entries),
            Err(e) => {
                tracing::warn!(error = %e, "log query returned malformed output");
                Self::Malformed {
                    error: e.to_string(),
                    raw: result.output,
                }
            }
        }
    }

    /// The parsed entries; empty for failures so processing can continue.
    pub fn entries(&self) -> &[LogEntry] {
        match self {
            Self::Entries(entries) => entries,
            Self::Failed(_) | Self::Malformed { .. } => &[],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Entries(_))
    }
}

/// Run `query` against the configured project.
pub async fn fetch_entries(
    runner: &dyn CommandRunner,
    query: &LogQuery,
    config: &DiagConfig,
) -> FetchOutcome {
    let spec = query.to_command(&config.project_id);
    let result = runner.run(&spec, config.query_timeout()).await;
    let outcome = FetchOutcome::from_exec(result);
    tracing::info!(
        filter = %query.filter(),
        entries = outcome.entries().len(),
        ok = outcome.is_success(),
        "log query finished"
    );
    outcome
}
