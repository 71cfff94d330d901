//! External command execution: the one boundary to `gcloud` and `git`.
//!
//! Every failure (spawn error, timeout, non-zero exit) is folded into an
//! [`ExecResult`] so callers can report it and keep going:
//! - Commands are given as program + argv (no shell interpretation)
//! - One timeout per call, child killed when it expires
//! - Captured stdout and stderr capped at 8 MiB each

use std::borrow::Cow;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

/// Maximum captured size of each output stream in bytes (8 MiB).
const MAX_OUTPUT_BYTES: usize = 8 * 1024 * 1024;

/// Exit code recorded when no exit status exists (spawn failure, timeout, signal).
pub const NO_EXIT_CODE: i32 = -1;

// ── Command spec ──────────────────────────────────────────────

/// A command to run: program, arguments and a human label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub description: String,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let program = program.into();
        Self {
            description: program.clone(),
            program,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The command as a copy-pasteable shell line.
    ///
    /// Words made only of flag-like characters (`--project=x`, `-5`) are left
    /// bare; anything else is quoted by `shell-words`, so the line splits back
    /// into the same argv.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|word| shell_word(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_word(word: &str) -> Cow<'_, str> {
    let bare = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if bare {
        Cow::Borrowed(word)
    } else {
        shell_words::quote(word)
    }
}

// ── Result ────────────────────────────────────────────────────

/// Uniform outcome of an external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    /// True iff the process exited with status 0.
    pub success: bool,
    /// Trimmed stdout.
    pub output: String,
    /// Trimmed stderr, or a description of why the process did not run.
    pub error: String,
    pub exit_code: i32,
    /// Set when the command was killed after this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ExecResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: String::new(),
            exit_code: 0,
            timeout_secs: None,
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: stderr.into(),
            exit_code,
            timeout_secs: None,
        }
    }

    pub fn spawn_failure(message: impl Into<String>) -> Self {
        Self::failed(NO_EXIT_CODE, message)
    }

    pub fn timeout(after: Duration) -> Self {
        let secs = after.as_secs();
        Self {
            timeout_secs: Some(secs),
            ..Self::failed(NO_EXIT_CODE, RunError::Timeout(secs).to_string())
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.timeout_secs.is_some()
    }

    /// Typed view: stdout on success, the failure otherwise.
    pub fn into_result(self) -> Result<String, RunError> {
        if self.success {
            Ok(self.output)
        } else if let Some(secs) = self.timeout_secs {
            Err(RunError::Timeout(secs))
        } else if self.exit_code == NO_EXIT_CODE {
            Err(RunError::Spawn(self.error))
        } else {
            Err(RunError::Failed {
                exit_code: self.exit_code,
                stderr: self.error,
            })
        }
    }
}

/// Why an external command produced no usable output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("could not start: {0}")]
    Spawn(String),
    #[error("timed out after {0}s")]
    Timeout(u64),
    #[error("exited with code {exit_code}: {stderr}")]
    Failed { exit_code: i32, stderr: String },
}

// ── Runner ────────────────────────────────────────────────────

/// Runs external commands. Implementations never fail; see [`ExecResult`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> ExecResult;
}

/// Runs commands as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    cwd: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command in `cwd`.
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> ExecResult {
        tracing::debug!(command = %spec.command_line(), "running external command");

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        let output = match tokio::time::timeout(timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!(program = %spec.program, error = %e, "command failed to start");
                return ExecResult::spawn_failure(format!("{}: {e}", spec.program));
            }
            Err(_) => {
                tracing::warn!(
                    command = %spec.description,
                    timeout_secs = timeout.as_secs(),
                    "command timed out"
                );
                return ExecResult::timeout(timeout);
            }
        };

        let stdout = cap_output(&output.stdout);
        let stderr = cap_output(&output.stderr);
        let exit_code = output.status.code().unwrap_or(NO_EXIT_CODE);

        if !output.status.success() {
            tracing::warn!(command = %spec.description, exit_code, "command exited non-zero");
        }

        ExecResult {
            success: output.status.success(),
            output: stdout.trim().to_string(),
            error: stderr.trim().to_string(),
            exit_code,
            timeout_secs: None,
        }
    }
}

/// Decode captured output, truncating at the last newline before the cap.
fn cap_output(bytes: &[u8]) -> String {
    if bytes.len() <= MAX_OUTPUT_BYTES {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    let head = &bytes[..MAX_OUTPUT_BYTES];
    let cut = head
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(head.len(), |pos| pos + 1);
    tracing::warn!(bytes = bytes.len(), "command output truncated");
    let mut text = String::from_utf8_lossy(&head[..cut]).into_owned();
    text.push_str("\n... [output truncated at 8MiB]");
    text
}
