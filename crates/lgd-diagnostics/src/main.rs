//! `lgd`: diagnose why the lead-generation service is not sending emails.
//!
//! Reports go to stdout; tracing goes to stderr.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lgd_diagnostics::commands;
use lgd_diagnostics::config::DiagConfig;
use lgd_diagnostics::runner::ProcessRunner;

#[derive(Parser)]
#[command(name = "lgd", version, about = "Cloud Run log diagnostics for the lead email pipeline")]
struct Cli {
    /// TOML config file; built-in defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recent errors, error patterns and subsystem activity.
    Errors,
    /// Email sending activity and successful sends.
    Emails,
    /// Run one log query and show the raw result.
    Logs,
    /// Run the diagnostic queries and save them to the output directory.
    Collect,
    /// Analyze a file saved by `collect`.
    Analyze {
        /// Defaults to the collect output in the output directory.
        file: Option<PathBuf>,
    },
    /// Snapshot of cloud and repository status.
    Status,
}

fn init_tracing() {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if std::env::var("LGD_LOG_JSON").is_ok_and(|v| v == "1") {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lgd starting");

    // ── Load config ─────────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => DiagConfig::from_file(path)?,
        None => DiagConfig::default(),
    };
    tracing::info!(
        project = %config.project_id,
        service = %config.service_name,
        "config loaded"
    );

    let runner = match &config.repo_path {
        Some(dir) => ProcessRunner::in_dir(dir),
        None => ProcessRunner::new(),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Errors => commands::errors::run(&runner, &config, &mut out).await?,
        Command::Emails => commands::emails::run(&runner, &config, &mut out).await?,
        Command::Logs => commands::logs::run(&runner, &config, &mut out).await?,
        Command::Collect => commands::collect::run(&runner, &config, &mut out).await?,
        Command::Analyze { file } => commands::analyze::run(file.as_deref(), &config, &mut out)?,
        Command::Status => commands::status::run(&runner, &config, &mut out).await?,
    }
    out.flush()?;
    Ok(())
}
