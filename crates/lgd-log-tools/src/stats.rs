//! Log statistics: severity counts and time range.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{LogEntry, Severity};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogStats {
    pub total: usize,
    /// Absent severities are counted under `DEFAULT`.
    pub by_severity: BTreeMap<Severity, usize>,
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

impl LogStats {
    pub fn compute(entries: &[LogEntry]) -> Self {
        let mut by_severity = BTreeMap::new();
        for entry in entries {
            *by_severity.entry(entry.severity_or_default()).or_default() += 1;
        }

        let timestamps = entries.iter().filter_map(|e| e.timestamp.as_deref());
        let earliest = timestamps.clone().min().map(str::to_string);
        let latest = timestamps.max().map(str::to_string);

        Self {
            total: entries.len(),
            by_severity,
            earliest,
            latest,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    /// ERROR and above.
    pub fn error_count(&self) -> usize {
        self.by_severity
            .iter()
            .filter(|(sev, _)| sev.is_error())
            .map(|(_, n)| n)
            .sum()
    }
}
