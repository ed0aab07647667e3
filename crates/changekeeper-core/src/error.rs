use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{MAX_INTERVAL_SECS, MIN_INTERVAL_SECS};

#[derive(Error, Debug)]
pub enum KeeperError {
    #[error("Repository error: {0}")]
    Repository(#[from] changekeeper_git::GitError),

    #[error("Malformed line {line_number} in fingerprint store {}: {line:?}", .path.display())]
    StoreParse {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    #[error(
        "Check interval must be between {min} and {max} seconds, got {0}",
        min = MIN_INTERVAL_SECS,
        max = MAX_INTERVAL_SECS
    )]
    InvalidInterval(u64),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl KeeperError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
