//! Parse `gcloud logging read --format=json` output into log entries.

use crate::error::{LogError, LogResult};
use crate::types::LogEntry;

/// Parse a JSON array of log entries.
///
/// Blank output (the CLI prints nothing when no entry matches) yields an empty
/// list. Array elements that are not objects are skipped.
pub fn parse_entries(text: &str) -> LogResult<Vec<LogEntry>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value = serde_json::from_str(text)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => return Err(LogError::NotAnArray(kind(&other))),
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(index, kind = kind(&item), "skipping non-object log entry");
            continue;
        }
        entries.push(serde_json::from_value(item)?);
    }
    Ok(entries)
}

fn kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    #[test]
    fn parse_gcloud_array() {
        let text = r#"[
            {"timestamp":"2024-01-01T11:00:00Z","severity":"ERROR","textPayload":"boom"},
            {"timestamp":"2024-01-01T10:00:00Z","jsonPayload":{"message":"ok"}}
        ]"#;
        let entries = parse_entries(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].severity, Some(Severity::Error));
        assert!(entries[1].json_payload.is_some());
        assert!(entries[1].severity.is_none());
    }

    #[test]
    fn blank_output_is_empty() {
        assert!(parse_entries("").unwrap().is_empty());
        assert!(parse_entries("  \n").unwrap().is_empty());
        assert!(parse_entries("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_output_is_an_error() {
        let err = parse_entries("ERROR: (gcloud.logging.read) permission denied").unwrap_err();
        assert!(matches!(err, LogError::Json(_)));
    }

    #[test]
    fn object_output_is_rejected() {
        let err = parse_entries(r#"{"entries": []}"#).unwrap_err();
        assert!(matches!(err, LogError::NotAnArray("object")));
    }

    #[test]
    fn non_object_elements_are_skipped() {
        let entries = parse_entries(r#"[1, "x", {"textPayload": "kept"}, null]"#).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text_payload.as_deref(), Some("kept"));
    }
}
