//! Keyword classifier: sort log entries into named, newest-first categories.
//!
//! Matching is a case-insensitive substring test. By default the haystack is
//! `textPayload` plus the serialized `jsonPayload` (see
//! [`LogEntry::combined_text`]), so a keyword that only appears in a payload
//! key name still matches. [`MatchMode::Structured`] restricts the haystack to
//! the text payload and the payload's leaf values.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{LogEntry, Severity};

/// Keywords that mark an entry as an error in [`classify`].
pub const ERROR_KEYWORDS: &[&str] = &["error", "fallo"];

/// Keywords used by [`error_category`].
pub const STRICT_ERROR_KEYWORDS: &[&str] = &["error"];

// ── Category definitions ──────────────────────────────────────

/// How keywords are matched against an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Against text payload + compact JSON of the structured payload.
    #[default]
    Serialized,
    /// Against text payload + string/number/bool leaves of the structured payload.
    Structured,
}

/// A named keyword bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    #[serde(rename = "keywords")]
    pub match_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub mode: MatchMode,
}

impl CategoryDef {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            match_keywords: to_owned(keywords),
            success_keywords: None,
            failure_keywords: None,
            mode: MatchMode::Serialized,
        }
    }

    pub fn with_success(mut self, keywords: &[&str]) -> Self {
        self.success_keywords = Some(to_owned(keywords));
        self
    }

    pub fn with_failure(mut self, keywords: &[&str]) -> Self {
        self.failure_keywords = Some(to_owned(keywords));
        self
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }
}

fn to_owned(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| (*k).to_string()).collect()
}

// ── Report ────────────────────────────────────────────────────

/// Entries of one category, borrowed from the classified input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport<'a> {
    pub name: String,
    pub entries: Vec<&'a LogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<Vec<&'a LogEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Vec<&'a LogEntry>>,
}

/// Result of [`classify`]. Every entry it holds is a reference into the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedReport<'a> {
    pub total: usize,
    pub warning_count: usize,
    pub errors: Vec<&'a LogEntry>,
    pub categories: Vec<CategoryReport<'a>>,
}

impl<'a> ClassifiedReport<'a> {
    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&CategoryReport<'a>> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Entries of a category, or an empty slice for unknown names.
    pub fn entries(&self, name: &str) -> &[&'a LogEntry] {
        self.category(name)
            .map(|c| c.entries.as_slice())
            .unwrap_or_default()
    }
}

// ── Operations ────────────────────────────────────────────────

/// Classify `entries` into error entries and one bucket per definition.
pub fn classify<'a>(entries: &'a [LogEntry], defs: &[CategoryDef]) -> ClassifiedReport<'a> {
    let lowered: Vec<String> = entries
        .iter()
        .map(|e| e.combined_text().to_lowercase())
        .collect();

    let errors = newest_first(
        entries
            .iter()
            .zip(&lowered)
            .filter(|(e, text)| e.has_error_severity() || contains_any(text, ERROR_KEYWORDS))
            .map(|(e, _)| e)
            .collect(),
    );

    let categories = defs
        .iter()
        .map(|def| {
            let matched: Vec<&LogEntry> = entries
                .iter()
                .zip(&lowered)
                .filter(|(e, text)| {
                    matches_def(e, text, def.mode, def.match_keywords.as_slice())
                })
                .map(|(e, _)| e)
                .collect();
            let matched = newest_first(matched);
            let subset = |keywords: &Option<Vec<String>>| {
                keywords.as_ref().map(|kw| {
                    matched
                        .iter()
                        .copied()
                        .filter(|e| entry_matches(e, def.mode, kw.as_slice()))
                        .collect::<Vec<_>>()
                })
            };
            CategoryReport {
                name: def.name.clone(),
                success: subset(&def.success_keywords),
                failure: subset(&def.failure_keywords),
                entries: matched,
            }
        })
        .collect();

    let warning_count = entries
        .iter()
        .filter(|e| e.severity == Some(Severity::Warning))
        .count();

    tracing::debug!(
        total = entries.len(),
        errors = errors.len(),
        categories = defs.len(),
        "classified log entries"
    );

    ClassifiedReport {
        total: entries.len(),
        warning_count,
        errors,
        categories,
    }
}

/// Entries with an error severity or mentioning "error", newest first.
pub fn error_category(entries: &[LogEntry]) -> Vec<&LogEntry> {
    newest_first(
        entries
            .iter()
            .filter(|e| {
                e.has_error_severity()
                    || contains_any(&e.combined_text().to_lowercase(), STRICT_ERROR_KEYWORDS)
            })
            .collect(),
    )
}

/// True when any keyword occurs in the entry, under the given mode.
pub fn entry_matches<S: AsRef<str>>(entry: &LogEntry, mode: MatchMode, keywords: &[S]) -> bool {
    matches_def(entry, &entry.combined_text().to_lowercase(), mode, keywords)
}

/// Stable sort, newest timestamp first, missing timestamps last.
pub fn newest_first(mut entries: Vec<&LogEntry>) -> Vec<&LogEntry> {
    entries.sort_by(|a, b| {
        compare_newest_first(a.timestamp.as_deref(), b.timestamp.as_deref())
    });
    entries
}

fn compare_newest_first(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn matches_def<S: AsRef<str>>(
    entry: &LogEntry,
    lowered_combined: &str,
    mode: MatchMode,
    keywords: &[S],
) -> bool {
    match mode {
        MatchMode::Serialized => contains_any(lowered_combined, keywords),
        MatchMode::Structured => {
            let text = entry.text_payload.as_deref().unwrap_or_default().to_lowercase();
            if contains_any(&text, keywords) {
                return true;
            }
            let mut leaves = Vec::new();
            if let Some(payload) = &entry.json_payload {
                collect_leaves(payload, &mut leaves);
            }
            leaves
                .iter()
                .any(|leaf| contains_any(&leaf.to_lowercase(), keywords))
        }
    }
}

fn contains_any<S: AsRef<str>>(lowered_haystack: &str, keywords: &[S]) -> bool {
    keywords.iter().any(|k| {
        let k = k.as_ref();
        !k.is_empty() && lowered_haystack.contains(&k.to_lowercase())
    })
}

fn collect_leaves(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) => out.push(s.clone()),
        serde_json::Value::Number(n) => out.push(n.to_string()),
        serde_json::Value::Bool(b) => out.push(b.to_string()),
        serde_json::Value::Array(items) => items.iter().for_each(|v| collect_leaves(v, out)),
        serde_json::Value::Object(map) => map.values().for_each(|v| collect_leaves(v, out)),
        serde_json::Value::Null => {}
    }
}
