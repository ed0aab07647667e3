use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::KeeperError;

/// Directory snapshots and the store are written to when none is given
pub const DEFAULT_OUTPUT_DIR: &str = "Keeper_Of_Changes";
/// Fingerprint store file name inside the output directory
pub const STORE_FILE_NAME: &str = "hashes.txt";

pub const DEFAULT_INTERVAL_SECS: u64 = 600;
pub const MIN_INTERVAL_SECS: u64 = 1;
pub const MAX_INTERVAL_SECS: u64 = 100_000;

/// Check an interval in whole seconds against the accepted range
pub fn validate_interval(secs: u64) -> Result<Duration, KeeperError> {
    if (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs) {
        Ok(Duration::from_secs(secs))
    } else {
        Err(KeeperError::InvalidInterval(secs))
    }
}

/// Where a monitor keeps its fingerprint store and snapshot batches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    base: PathBuf,
}

impl OutputLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn store_path(&self) -> PathBuf {
        self.base.join(STORE_FILE_NAME)
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

/// Settings for a monitor run
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Repository working tree being watched
    pub repo_path: PathBuf,
    pub layout: OutputLayout,
    /// Pause between the end of one pass and the start of the next
    pub interval: Duration,
    /// Stop after this many passes (None = until cancelled)
    pub max_passes: Option<usize>,
}

impl MonitorConfig {
    /// Build a config, rejecting intervals outside the accepted range
    pub fn new(
        repo_path: PathBuf,
        output_path: PathBuf,
        interval_secs: u64,
    ) -> Result<Self, KeeperError> {
        Ok(Self {
            repo_path,
            layout: OutputLayout::new(output_path),
            interval: validate_interval(interval_secs)?,
            max_passes: None,
        })
    }

    pub fn with_max_passes(mut self, max: usize) -> Self {
        self.max_passes = Some(max);
        self
    }

    pub fn should_continue(&self, passes: usize) -> bool {
        match self.max_passes {
            Some(max) => passes < max,
            None => true,
        }
    }
}
