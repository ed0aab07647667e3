use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::KeeperError;
use crate::fingerprint::Fingerprint;

pub const BATCH_DIR_PREFIX: &str = "changes_";
pub const SNAPSHOT_SUFFIX: &str = ".diff";

/// `changes_YYYYMMDD_HHMMSS` for the given local time
pub fn batch_dir_name(at: &DateTime<Local>) -> String {
    format!("{}{}", BATCH_DIR_PREFIX, at.format("%Y%m%d_%H%M%S"))
}

/// Snapshot file name for a tracked path: its base name plus `.diff`.
/// Two paths sharing a base name map to the same file.
pub fn snapshot_file_name(path: &str) -> String {
    let base = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    format!("{}{}", base, SNAPSHOT_SUFFIX)
}

/// A diff recorded during a scan pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Repository-relative path of the tracked file
    pub path: String,
    pub fingerprint: Fingerprint,
    /// Where the diff text was written
    pub file: PathBuf,
}

/// Writes novel diffs for one scan pass.
///
/// The batch directory is created on the first novel change and reused for
/// the rest of the pass; a pass without novel changes creates nothing.
#[derive(Debug)]
pub struct SnapshotWriter {
    output_dir: PathBuf,
    batch_dir: Option<PathBuf>,
}

impl SnapshotWriter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            batch_dir: None,
        }
    }

    /// Record `diff_text` for `path` if it differs from `previous`.
    ///
    /// Returns `None` when the diff was already recorded.
    pub fn maybe_snapshot(
        &mut self,
        path: &str,
        diff_text: &str,
        previous: Option<&Fingerprint>,
    ) -> Result<Option<Snapshot>, KeeperError> {
        let current = Fingerprint::of(diff_text);

        if previous == Some(&current) {
            debug!(path, "Diff already recorded");
            return Ok(None);
        }

        let batch_dir = self.batch_dir()?;
        let file = batch_dir.join(snapshot_file_name(path));
        fs::write(&file, diff_text).map_err(|e| KeeperError::io(&file, e))?;

        debug!(path, file = %file.display(), "Wrote snapshot");

        Ok(Some(Snapshot {
            path: path.to_string(),
            fingerprint: current,
            file,
        }))
    }

    fn batch_dir(&mut self) -> Result<PathBuf, KeeperError> {
        if let Some(ref dir) = self.batch_dir {
            return Ok(dir.clone());
        }

        let dir = self.output_dir.join(batch_dir_name(&Local::now()));
        fs::create_dir_all(&dir).map_err(|e| KeeperError::io(&dir, e))?;
        info!(dir = %dir.display(), "Created snapshot batch");

        self.batch_dir = Some(dir.clone());
        Ok(dir)
    }

    /// The batch directory, if any novel change was written
    pub fn batch(&self) -> Option<&Path> {
        self.batch_dir.as_deref()
    }

    pub fn into_batch(self) -> Option<PathBuf> {
        self.batch_dir
    }
}
