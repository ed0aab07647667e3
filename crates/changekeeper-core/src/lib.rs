//! # changekeeper-core
//!
//! Change detection and deduplicated snapshot persistence.
//!
//! A scan pass asks the repository which tracked files have pending
//! changes, fingerprints each file's diff, and writes the diffs whose
//! fingerprint has not been recorded before into a single timestamped batch
//! directory. The [`Monitor`] repeats passes on an interval.
//!
//! ## On-disk layout
//!
//! ```text
//! <output>/hashes.txt                              path fingerprint, one per line
//! <output>/changes_<YYYYMMDD_HHMMSS>/<base>.diff   one batch per pass with novel changes
//! ```

mod config;
mod error;
mod fingerprint;
mod loop_runner;
mod outcome;
mod scan;
mod snapshot;
mod store;

pub use config::{
    validate_interval, MonitorConfig, OutputLayout, DEFAULT_INTERVAL_SECS, DEFAULT_OUTPUT_DIR,
    MAX_INTERVAL_SECS, MIN_INTERVAL_SECS, STORE_FILE_NAME,
};
pub use error::KeeperError;
pub use fingerprint::Fingerprint;
pub use loop_runner::Monitor;
pub use outcome::{MonitorSummary, ScanOutcome, SkipReason, SkippedFile};
pub use scan::ScanRunner;
pub use snapshot::{
    batch_dir_name, snapshot_file_name, Snapshot, SnapshotWriter, BATCH_DIR_PREFIX,
    SNAPSHOT_SUFFIX,
};
pub use store::FingerprintStore;
