//! Lead-generation diagnostics: log retrieval, classification and status
//! snapshots for the Cloud Run email pipeline.
//!
//! Re-exports all modules so external crates (e.g. `lgd-e2e-tests`) can
//! drive the subcommands with a `MockRunner`.

pub mod commands;
pub mod config;
pub mod mock;
pub mod query;
pub mod render;
pub mod report;
pub mod runner;
pub mod status;

pub use config::DiagConfig;
pub use mock::MockRunner;
pub use query::{FetchOutcome, LogQuery, fetch_entries};
pub use report::{ReportError, ReportResult, ReportWriter};
pub use runner::{CommandRunner, CommandSpec, ExecResult, ProcessRunner, RunError};
