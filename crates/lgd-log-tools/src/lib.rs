//! Log analysis for Cloud Run diagnostics.
//!
//! Parses `gcloud logging read` output into [`LogEntry`] records, sorts them
//! into keyword categories with [`classify`], and summarizes errors with
//! [`analyze_errors`] and [`LogStats`]. Everything here is pure: no I/O, no
//! shared state.

pub mod classify;
pub mod error;
pub mod fixtures;
pub mod parse;
pub mod patterns;
pub mod stats;
pub mod types;

// Re-export key types for convenience
pub use classify::{
    CategoryDef, CategoryReport, ClassifiedReport, MatchMode, classify, entry_matches,
    error_category, newest_first,
};
pub use error::{LogError, LogResult};
pub use parse::parse_entries;
pub use patterns::{ErrorAnalysis, PatternStats, analyze_error_entries, analyze_errors};
pub use stats::LogStats;
pub use types::{LogEntry, Severity};
