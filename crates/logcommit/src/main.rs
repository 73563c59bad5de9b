//! logcommit CLI
//!
//! Counts a device-programming log and commits the result to the record
//! store and the log archive.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};

use logcommit::config::load_config_or_default;
use logcommit::pipeline::{CommitRequest, TracingProgress};
use logcommit::{app, logging, report};
use logcommit::{JobMetadata, LocalSourceFile, LogCommitError, LogMetrics, Settings};

#[derive(Parser)]
#[command(name = "logcommit")]
#[command(about = "Commit device-programming log results to a database and an archive", long_about = None)]
struct Cli {
    /// Config file (defaults to <config_dir>/logcommit/config.json)
    #[arg(long, global = true, env = "LOGCOMMIT_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the programmed and verified counts of a log file
    Count {
        /// Log file (defaults to the last one used)
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Count a log file and commit the result
    Commit(CommitArgs),
}

#[derive(Args)]
struct CommitArgs {
    /// Job month, JAN..DEC
    #[arg(long)]
    month: String,

    /// Numeric job number
    #[arg(long)]
    job_number: String,

    /// Job quantity
    #[arg(long)]
    quantity: String,

    /// Device name (defaults to the last one used)
    #[arg(long)]
    device: Option<String>,

    /// Log file (defaults to the last one used)
    #[arg(long)]
    log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = load_config_or_default(cli.config.as_deref())?;
    logging::init_tracing(cli.log_json || config.logging.json)?;

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let mut settings = load_settings();

    match cli.command {
        Command::Count { log } => {
            let path = log_path(log, &settings)?;
            let payload = read_log(&path).await?;
            let metrics = LogMetrics::count_bytes(&payload);
            println!(
                "Programmed: {}\nVerified: {}",
                metrics.programmed_count, metrics.verified_count
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Commit(args) => {
            let device = args
                .device
                .clone()
                .unwrap_or_else(|| settings.device_name.clone());
            let path = log_path(args.log.clone(), &settings)?;

            let metadata =
                JobMetadata::from_form(&args.month, &args.job_number, &args.quantity, &device)
                    .map_err(LogCommitError::from)?;

            settings.remember(&device, &path);
            save_settings(&settings);

            let payload = read_log(&path).await?;
            let pipeline = app::build_pipeline(&config)?;

            let request = CommitRequest::from_log(metadata, payload);
            let source = LocalSourceFile::new(&path);
            let commit_report = pipeline.commit(request, &source, &TracingProgress).await;

            println!("{}", report::render(&commit_report));
            Ok(ExitCode::from(report::exit_code(&commit_report.outcome)))
        }
    }
}

fn load_settings() -> Settings {
    let Some(path) = Settings::default_path() else {
        return Settings::default();
    };
    Settings::load(&path).unwrap_or_else(|e| {
        warn!(error = %e, "Could not load saved settings, starting fresh");
        Settings::default()
    })
}

fn save_settings(settings: &Settings) {
    if let Some(path) = Settings::default_path() {
        if let Err(e) = settings.save(&path) {
            warn!(error = %e, "Could not save settings");
        }
    }
}

fn log_path(explicit: Option<PathBuf>, settings: &Settings) -> Result<PathBuf> {
    explicit
        .or_else(|| settings.last_log_path.clone())
        .context("No log file given and none remembered; pass --log <path>")
}

async fn read_log(path: &Path) -> Result<Vec<u8>> {
    let payload = tokio::fs::read(path)
        .await
        .map_err(|source| LogCommitError::ReadLog {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(payload)
}
