//! Core log types: Cloud Logging severity and the log entry record.

use serde::{Deserialize, Deserializer, Serialize};

// ── Severity ──────────────────────────────────────────────────

/// Cloud Logging severity, ordered from least to most severe.
///
/// Variant declaration order matters: `#[derive(Ord)]` uses it,
/// so Default < Debug < Info < ... < Emergency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Default,
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Severity {
    pub const ALL: [Severity; 9] = [
        Self::Default,
        Self::Debug,
        Self::Info,
        Self::Notice,
        Self::Warning,
        Self::Error,
        Self::Critical,
        Self::Alert,
        Self::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Notice => "NOTICE",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Alert => "ALERT",
            Self::Emergency => "EMERGENCY",
        }
    }

    /// Parse a severity name, case-insensitively. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// ERROR and above.
    pub fn is_error(&self) -> bool {
        *self >= Self::Error
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Log Entry ─────────────────────────────────────────────────

/// One record from `gcloud logging read --format=json`.
///
/// Deserialization is lenient: missing fields, `null`, wrong-typed values and
/// unknown severities all become `None` rather than errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// ISO-8601 timestamp, compared lexicographically.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_severity",
        skip_serializing_if = "Option::is_none"
    )]
    pub severity: Option<Severity>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub text_payload: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub json_payload: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub insert_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub log_name: Option<String>,
}

impl LogEntry {
    /// Build a text entry. Mostly useful for tests and fixtures.
    pub fn text(
        timestamp: impl Into<String>,
        severity: Severity,
        text_payload: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            severity: Some(severity),
            text_payload: Some(text_payload.into()),
            ..Self::default()
        }
    }

    /// Build a structured entry.
    pub fn json(
        timestamp: impl Into<String>,
        severity: Severity,
        json_payload: serde_json::Value,
    ) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            severity: Some(severity),
            json_payload: Some(json_payload),
            ..Self::default()
        }
    }

    /// Severity with absence mapped to `DEFAULT`.
    pub fn severity_or_default(&self) -> Severity {
        self.severity.unwrap_or(Severity::Default)
    }

    pub fn has_error_severity(&self) -> bool {
        self.severity.is_some_and(|s| s.is_error())
    }

    /// Compact JSON serialization of `jsonPayload`, if any.
    pub fn payload_json(&self) -> Option<String> {
        self.json_payload
            .as_ref()
            .map(|v| serde_json::to_string(v).unwrap_or_default())
    }

    /// `textPayload` followed by the serialized `jsonPayload`.
    ///
    /// This is the haystack for keyword matching. Key names of the payload are
    /// part of it.
    pub fn combined_text(&self) -> String {
        let mut text = self.text_payload.clone().unwrap_or_default();
        if let Some(json) = self.payload_json() {
            text.push_str(&json);
        }
        text
    }

    /// Text to show a human: `textPayload` when non-empty, else the payload JSON.
    pub fn display_text(&self) -> String {
        match self.text_payload.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.payload_json().unwrap_or_default(),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_severity<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.and_then(|s| Severity::parse(&s)))
}

fn non_null<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_null()))
}
