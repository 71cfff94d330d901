//! Sample log-query output for tests: a realistic slice of a Cloud Run
//! service that receives Gmail push notifications over Pub/Sub.

use crate::parse::parse_entries;
use crate::types::LogEntry;

/// What `gcloud logging read --format=json` returns for the sample service.
///
/// Newest first, as the CLI orders it.
pub const CLOUD_RUN_SAMPLE_JSON: &str = r#"[
  {
    "insertId": "66f1a0b2000d1",
    "severity": "ERROR",
    "textPayload": "[airtable] Error creando registro: timeout after 30000ms",
    "timestamp": "2024-01-15T12:00:40Z"
  },
  {
    "insertId": "66f1a0b2000d2",
    "severity": "INFO",
    "jsonPayload": {"message": "Email de lead enviado exitosamente", "to": "ventas@example.com"},
    "timestamp": "2024-01-15T12:00:35Z"
  },
  {
    "insertId": "66f1a0b2000d3",
    "severity": "INFO",
    "textPayload": "[airtable] Registro creado recXYZ",
    "timestamp": "2024-01-15T12:00:30Z"
  },
  {
    "insertId": "66f1a0b2000d4",
    "severity": "WARNING",
    "textPayload": "[history] historyId 9911 <= guardado 9920, nada que procesar",
    "timestamp": "2024-01-15T12:00:25Z"
  },
  {
    "insertId": "66f1a0b2000d5",
    "severity": "INFO",
    "textPayload": "[mfs] procesando mensaje 18c2f; IDs que voy a procesar: 1",
    "timestamp": "2024-01-15T12:00:20Z"
  },
  {
    "insertId": "66f1a0b2000d6",
    "severity": "INFO",
    "textPayload": "[mfs] _pubsub notificacion recibida historyId=9911",
    "timestamp": "2024-01-15T12:00:15Z"
  },
  {
    "insertId": "66f1a0b2000d7",
    "severity": "ERROR",
    "jsonPayload": {"message": "sendLeadEmail failed", "error": "invalid_grant"},
    "timestamp": "2024-01-15T12:00:10Z"
  },
  {
    "insertId": "66f1a0b2000d8",
    "severity": "DEFAULT",
    "textPayload": "Container started",
    "timestamp": "2024-01-15T12:00:05Z"
  }
]"#;

/// The sample output parsed into entries.
pub fn cloud_run_sample() -> Vec<LogEntry> {
    parse_entries(CLOUD_RUN_SAMPLE_JSON).unwrap_or_default()
}
