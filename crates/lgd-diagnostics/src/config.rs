//! Diagnostics configuration, loadable from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use lgd_log_tools::CategoryDef;
use serde::Deserialize;

/// Everything the subcommands need to know about the target service.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagConfig {
    /// GCP project that hosts the service.
    #[serde(default = "default_project_id")]
    pub project_id: String,
    /// Cloud Run service name.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Monitored resource type used in log filters.
    #[serde(default = "default_resource_type")]
    pub resource_type: String,
    /// Working directory for git probes. None uses the current directory.
    #[serde(default)]
    pub repo_path: Option<PathBuf>,
    /// Where persisted reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Timeout applied to every external command.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
    /// Default preview length, in characters.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryDef>,
}

fn default_project_id() -> String {
    "check-in-sf".to_string()
}

fn default_service_name() -> String {
    "mfs-lead-generation-ai".to_string()
}

fn default_region() -> String {
    "us-central1".to_string()
}

fn default_resource_type() -> String {
    "cloud_run_revision".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("auto_logs")
}

fn default_query_timeout() -> u64 {
    60
}

fn default_preview_chars() -> usize {
    300
}

/// Category names the subcommands look up.
pub mod category {
    pub const PUBSUB: &str = "pubsub";
    pub const AIRTABLE: &str = "airtable";
    pub const EMAIL: &str = "email";
    pub const PROCESSING: &str = "processing";
    pub const HISTORY: &str = "history";
}

pub fn default_categories() -> Vec<CategoryDef> {
    vec![
        CategoryDef::new(category::PUBSUB, &["_pubsub"]),
        CategoryDef::new(category::AIRTABLE, &["airtable"])
            .with_success(&["creado", "exitoso"])
            .with_failure(&["error", "fallo"]),
        CategoryDef::new(category::EMAIL, &["email", "sendleademail"])
            .with_success(&["email de lead enviado", "exitosamente"])
            .with_failure(&["error enviando email"]),
        CategoryDef::new(
            category::PROCESSING,
            &[
                "procesando mensaje",
                "ids que voy a procesar",
                "delta inbox",
            ],
        ),
        CategoryDef::new(category::HISTORY, &["[history]"]),
    ]
}

impl Default for DiagConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            service_name: default_service_name(),
            region: default_region(),
            resource_type: default_resource_type(),
            repo_path: None,
            output_dir: default_output_dir(),
            query_timeout_secs: default_query_timeout(),
            preview_chars: default_preview_chars(),
            categories: default_categories(),
        }
    }
}

impl DiagConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        let mut seen = std::collections::HashSet::new();
        for def in &config.categories {
            if !seen.insert(def.name.as_str()) {
                anyhow::bail!("{}: duplicate category {:?}", path.display(), def.name);
            }
        }
        Ok(config)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn category(&self, name: &str) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Only the named categories, in the given order. Unknown names are skipped.
    pub fn categories_named(&self, names: &[&str]) -> Vec<CategoryDef> {
        names
            .iter()
            .filter_map(|n| self.category(n).cloned())
            .collect()
    }
}
