//! Persist diagnostic reports to the output directory.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias for report results.
pub type ReportResult<T> = Result<T, ReportError>;

/// Writes JSON and text reports into one directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Pretty-printed JSON, non-ASCII kept as is.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> ReportResult<PathBuf> {
        let body = serde_json::to_string_pretty(value)?;
        self.write_text(name, &body)
    }

    pub fn write_text(&self, name: &str, body: &str) -> ReportResult<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ReportError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(name);
        std::fs::write(&path, body).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = body.len(), "report written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn writes_json_into_new_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(tmp.path().join("auto_logs"));
        let path = writer
            .write_json("status.json", &json!({"servicio": "envío ok"}))
            .unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("envío ok"));
        assert!(body.contains('\n'), "pretty printed");
    }

    #[test]
    fn writes_text() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(tmp.path());
        let path = writer.write_text("summary.txt", "hola\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hola\n");
    }

    #[test]
    fn unwritable_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("occupied");
        std::fs::write(&file, "x").unwrap();
        let writer = ReportWriter::new(file.join("sub"));
        let err = writer.write_text("a.txt", "x").unwrap_err();
        assert!(matches!(err, ReportError::CreateDir { .. }));
    }
}
