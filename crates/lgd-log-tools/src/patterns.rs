//! Error pattern analysis: group error entries by known failure causes.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::classify::error_category;
use crate::types::LogEntry;

// ── Known error pattern categories ────────────────────────────

struct ErrorPattern {
    category: &'static str,
    regex: Regex,
    description: &'static str,
}

impl ErrorPattern {
    fn new(category: &'static str, pattern: &str, description: &'static str) -> Self {
        Self {
            category,
            regex: Regex::new(pattern).expect("error pattern regex is valid"),
            description,
        }
    }
}

/// First match wins, so the more specific causes come first.
static ERROR_PATTERNS: LazyLock<Vec<ErrorPattern>> = LazyLock::new(|| {
    vec![
        ErrorPattern::new(
            "auth_error",
            r"(?i)(invalid_grant|token\s+(has\s+been\s+)?(expired|revoked)|refresh\s+token|unauthenticated|invalid\s+credentials|\b401\b)",
            "OAuth token or credential problem",
        ),
        ErrorPattern::new(
            "permission_error",
            r"(?i)(permission\s+denied|access\s+denied|forbidden|insufficient\s+permission|PERMISSION_DENIED|\b403\b)",
            "Permission or IAM issue",
        ),
        ErrorPattern::new(
            "quota_error",
            r"(?i)(rate\s*limit|quota\s+exceeded|too\s+many\s+requests|RESOURCE_EXHAUSTED|\b429\b)",
            "Quota or rate limit exhausted",
        ),
        ErrorPattern::new(
            "timeout_error",
            r"(?i)(timeout|timed?\s*out|deadline\s+exceeded|DEADLINE_EXCEEDED)",
            "Operation timeout",
        ),
        ErrorPattern::new(
            "connection_error",
            r"(?i)(connection\s+(refused|reset|closed)|ECONNREFUSED|ECONNRESET|ENOTFOUND|socket\s+hang\s+up|network\s+error)",
            "Network connectivity issue",
        ),
        ErrorPattern::new(
            "not_found_error",
            r"(?i)(not\s+found|no\s+encontrad[oa]|\b404\b|NOT_FOUND)",
            "Missing resource or record",
        ),
        ErrorPattern::new(
            "integration_error",
            r"(?i)(airtable|gmail|salesforce|sheets|pub/?sub|vertex)",
            "Failure inside an external integration",
        ),
    ]
});

// ── Analysis result ───────────────────────────────────────────

/// Aggregated statistics for one matched pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternStats {
    pub category: &'static str,
    pub description: &'static str,
    pub count: usize,
    /// Oldest timestamp among matches.
    pub first_seen: Option<String>,
    /// Newest timestamp among matches.
    pub last_seen: Option<String>,
    /// Up to three messages, newest first.
    pub examples: Vec<String>,
}

/// Result of [`analyze_errors`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorAnalysis {
    pub error_count: usize,
    /// Sorted by count, descending.
    pub patterns: Vec<PatternStats>,
    pub unclassified_count: usize,
    /// Up to five messages, newest first.
    pub unclassified_examples: Vec<String>,
    /// Percentage of errors that matched a pattern, rounded.
    pub classification_rate: f64,
}

const MAX_PATTERN_EXAMPLES: usize = 3;
const MAX_UNCLASSIFIED_EXAMPLES: usize = 5;

/// Classify the error entries of `entries` by known failure pattern.
pub fn analyze_errors(entries: &[LogEntry]) -> ErrorAnalysis {
    analyze_error_entries(&error_category(entries))
}

/// Classify an already selected error set (newest first) by known failure pattern.
pub fn analyze_error_entries(errors: &[&LogEntry]) -> ErrorAnalysis {
    let mut stats: HashMap<&'static str, PatternStats> = HashMap::new();
    let mut unclassified_count = 0;
    let mut unclassified_examples = Vec::new();

    for entry in errors {
        let text = entry.combined_text();
        match ERROR_PATTERNS.iter().find(|p| p.regex.is_match(&text)) {
            Some(pattern) => {
                let s = stats.entry(pattern.category).or_insert_with(|| PatternStats {
                    category: pattern.category,
                    description: pattern.description,
                    count: 0,
                    first_seen: None,
                    last_seen: None,
                    examples: Vec::new(),
                });
                s.count += 1;
                if s.examples.len() < MAX_PATTERN_EXAMPLES {
                    s.examples.push(entry.display_text());
                }
                if s.last_seen.is_none() {
                    s.last_seen = entry.timestamp.clone();
                }
                if entry.timestamp.is_some() {
                    s.first_seen = entry.timestamp.clone();
                }
            }
            None => {
                unclassified_count += 1;
                if unclassified_examples.len() < MAX_UNCLASSIFIED_EXAMPLES {
                    unclassified_examples.push(entry.display_text());
                }
            }
        }
    }

    let mut patterns: Vec<PatternStats> = stats.into_values().collect();
    patterns.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(b.category)));

    let error_count = errors.len();
    let classified = error_count - unclassified_count;
    let classification_rate = if error_count > 0 {
        (classified as f64 / error_count as f64 * 100.0).round()
    } else {
        100.0
    };

    tracing::debug!(
        error_count,
        pattern_count = patterns.len(),
        classification_rate,
        "analyzed error patterns"
    );

    ErrorAnalysis {
        error_count,
        patterns,
        unclassified_count,
        unclassified_examples,
        classification_rate,
    }
}
