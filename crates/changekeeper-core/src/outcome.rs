use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::snapshot::Snapshot;

/// Why a changed file was left out of a scan pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SkipReason {
    /// Reported as changed but gone from disk by the time it was processed
    Missing,
    /// The diff for this path could not be produced
    Diff(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("file does not exist in the repository"),
            Self::Diff(message) => write!(f, "diff failed: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
}

/// The result of one scan pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Nothing pending in the working tree; the store was not touched
    Clean,
    /// Every changed file matched its recorded fingerprint
    NoNewChanges {
        unchanged: Vec<String>,
        skipped: Vec<SkippedFile>,
    },
    /// At least one novel change was written and the store saved
    Saved {
        batch_dir: PathBuf,
        captured: Vec<Snapshot>,
        unchanged: Vec<String>,
        skipped: Vec<SkippedFile>,
    },
}

impl ScanOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    pub fn batch_dir(&self) -> Option<&Path> {
        match self {
            Self::Saved { batch_dir, .. } => Some(batch_dir),
            _ => None,
        }
    }

    pub fn captured(&self) -> &[Snapshot] {
        match self {
            Self::Saved { captured, .. } => captured,
            _ => &[],
        }
    }

    pub fn skipped(&self) -> &[SkippedFile] {
        match self {
            Self::Clean => &[],
            Self::NoNewChanges { skipped, .. } => skipped,
            Self::Saved { skipped, .. } => skipped,
        }
    }
}

/// Totals for a finished monitor run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonitorSummary {
    pub passes: usize,
    pub batches: usize,
    pub failed_passes: usize,
    /// Whether the run ended through cancellation rather than a pass limit
    pub cancelled: bool,
}

impl MonitorSummary {
    pub fn exit_code(&self) -> i32 {
        if self.cancelled {
            130
        } else {
            0
        }
    }
}
