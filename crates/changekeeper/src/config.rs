//! Configuration file support for changekeeper.
//!
//! Settings come from the command line, then `changekeeper.toml`, then
//! built-in defaults, in that order of priority.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use changekeeper_core::{validate_interval, DEFAULT_INTERVAL_SECS, DEFAULT_OUTPUT_DIR};
use changekeeper_logging::LogFormat;

/// The config file name looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "changekeeper.toml";

/// Settings loaded from `changekeeper.toml`
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Seconds between scan passes
    pub interval: Option<u64>,
    /// Directory for the fingerprint store and snapshot batches
    pub output_path: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
    /// Append JSON-lines events to this file
    pub log_file: Option<PathBuf>,
    /// tracing filter used when RUST_LOG is not set
    pub log_level: Option<String>,
}

impl FileConfig {
    /// Load configuration from `path`.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    /// Load an explicitly requested file, which must exist
    pub fn load_required(path: &Path) -> Result<Self> {
        Self::load(path)?
            .with_context(|| format!("Config file not found: {}", path.display()))
    }
}

/// Values given on the command line, all optional so the config file can
/// fill the gaps
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub interval: Option<u64>,
    pub output_path: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub interval_secs: u64,
    pub output_path: PathBuf,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

impl Settings {
    /// Merge CLI values over file values over defaults.
    /// The interval is validated whichever source it came from.
    pub fn resolve(cli: CliOverrides, file: Option<FileConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let interval_secs = cli
            .interval
            .or(file.interval)
            .unwrap_or(DEFAULT_INTERVAL_SECS);
        validate_interval(interval_secs)?;

        Ok(Self {
            interval_secs,
            output_path: cli
                .output_path
                .or(file.output_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            log_format: cli.log_format.or(file.log_format).unwrap_or_default(),
            log_file: cli.log_file.or(file.log_file),
            log_level: cli
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| "warn".to_string()),
        })
    }
}
