use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;

use changekeeper_core::{validate_interval, Monitor, MonitorConfig};
use changekeeper_git::ChangeScanner;
use changekeeper_logging::{init_tracing, LogFormat, Logger};

mod config;

use config::{CliOverrides, FileConfig, Settings, CONFIG_FILE_NAME};

#[derive(Parser, Debug)]
#[command(
    name = "changekeeper",
    about = "Monitor a git repository and archive each new uncommitted diff",
    version,
    author
)]
struct Cli {
    /// Path to the folder containing the git repository
    repo_path: PathBuf,

    /// Check interval in seconds, 1 to 100000 (default: 600)
    #[arg(long, value_parser = parse_interval)]
    interval: Option<u64>,

    /// Folder where changes are saved (default: Keeper_Of_Changes)
    #[arg(long, alias = "output_path")]
    output_path: Option<PathBuf>,

    /// Config file (default: ./changekeeper.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormatChoice>,

    /// Also append events as JSON lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Diagnostic log filter when RUST_LOG is not set (default: warn)
    #[arg(long)]
    log_level: Option<String>,

    /// Run a single scan pass and exit
    #[arg(long)]
    once: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn parse_interval(value: &str) -> Result<u64, String> {
    let secs: u64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a whole number of seconds", value))?;
    validate_interval(secs).map_err(|e| e.to_string())?;
    Ok(secs)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = match cli.config {
        Some(ref path) => Some(FileConfig::load_required(path)?),
        None => FileConfig::load(&PathBuf::from(CONFIG_FILE_NAME))?,
    };

    let overrides = CliOverrides {
        interval: cli.interval,
        output_path: cli.output_path.clone(),
        log_format: cli.log_format.map(Into::into),
        log_file: cli.log_file.clone(),
        log_level: cli.log_level.clone(),
    };
    let settings = Settings::resolve(overrides, file_config)?;

    init_tracing(&settings.log_level, settings.log_format);

    let logger = match settings.log_file {
        Some(ref path) => Logger::with_file(settings.log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(settings.log_format),
    };

    // A bad repository path is fatal before any pass runs
    let scanner = ChangeScanner::open(&cli.repo_path)
        .with_context(|| format!("Cannot monitor {}", cli.repo_path.display()))?;

    let mut monitor_config = MonitorConfig::new(
        cli.repo_path.clone(),
        settings.output_path.clone(),
        settings.interval_secs,
    )?;
    if cli.once {
        monitor_config = monitor_config.with_max_passes(1);
    }

    let monitor = Monitor::new(scanner, monitor_config, Arc::new(logger));

    // Handle Ctrl+C by ending the current sleep
    let cancel = CancellationToken::new();
    let cancel_handle = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Stopping after the current pass...");
        cancel_handle.cancel();
    })
    .context("Failed to set Ctrl+C handler")?;

    let summary = monitor.run(cancel).await?;

    std::process::exit(summary.exit_code());
}
