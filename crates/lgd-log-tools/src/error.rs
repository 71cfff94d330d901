//! Log tool error types.

use thiserror::Error;

/// Errors that can occur while reading log-query output.
///
/// Classification itself never fails; only turning raw command output into
/// entries can.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("malformed log output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of log entries, got {0}")]
    NotAnArray(&'static str),
}

/// Convenience alias for log tool results.
pub type LogResult<T> = Result<T, LogError>;
