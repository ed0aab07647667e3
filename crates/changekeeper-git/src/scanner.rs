use git2::{Diff, DiffFormat, DiffOptions, Repository, StatusOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::TreeStatus;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("Git operation failed: {0}")]
    GitOperationFailed(#[from] git2::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to diff {path}: {message}")]
    Diff { path: String, message: String },
}

/// Operations the change monitor needs from a version-control backend
pub trait ChangeSource {
    /// Root of the working tree that changed paths are relative to
    fn workdir(&self) -> &Path;

    /// Current working tree status, untracked files included
    fn status(&self) -> Result<TreeStatus, GitError>;

    /// Paths of tracked files whose working copy differs from the index
    fn changed_paths(&self) -> Result<Vec<String>, GitError>;

    /// Patch text for a single path, working tree against the index
    fn diff_text(&self, path: &str) -> Result<String, GitError>;

    /// Whether anything is pending at all
    fn is_dirty(&self) -> Result<bool, GitError> {
        Ok(!self.status()?.is_clean())
    }
}

/// git2-backed [`ChangeSource`] for a single repository
///
/// The repository is reopened for each query so that index updates made by
/// other processes between scans are always picked up.
#[derive(Debug, Clone)]
pub struct ChangeScanner {
    workdir: PathBuf,
}

impl ChangeScanner {
    /// Open the repository whose working tree root is `repo_path`
    pub fn open(repo_path: &Path) -> Result<Self, GitError> {
        let repo = Repository::open(repo_path)
            .map_err(|e| GitError::NotARepo(format!("{} ({})", repo_path.display(), e.message())))?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| {
                GitError::NotARepo(format!("{} (bare repository)", repo_path.display()))
            })?
            .to_path_buf();

        debug!(workdir = %workdir.display(), "Opened repository");

        Ok(Self { workdir })
    }

    fn repo(&self) -> Result<Repository, GitError> {
        Repository::open(&self.workdir)
            .map_err(|e| GitError::NotARepo(format!("{} ({})", self.workdir.display(), e.message())))
    }
}

impl ChangeSource for ChangeScanner {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn status(&self) -> Result<TreeStatus, GitError> {
        let repo = self.repo()?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(false)
            .include_ignored(false);

        let statuses = repo.statuses(Some(&mut opts))?;

        let mut status = TreeStatus::default();
        for entry in statuses.iter() {
            let path = String::from_utf8_lossy(entry.path_bytes()).into_owned();
            status.record(&path, entry.status());
        }

        debug!(
            modified = status.modified.len(),
            staged = status.staged.len(),
            deleted = status.deleted.len(),
            untracked = status.untracked.len(),
            "Captured working tree status"
        );

        Ok(status)
    }

    fn changed_paths(&self) -> Result<Vec<String>, GitError> {
        let repo = self.repo()?;

        let mut opts = DiffOptions::new();
        opts.include_untracked(false);

        let diff = repo.diff_index_to_workdir(None, Some(&mut opts))?;

        let paths: Vec<String> = diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.to_string_lossy().into_owned())
            })
            .collect();

        debug!(count = paths.len(), "Listed changed paths");

        Ok(paths)
    }

    fn diff_text(&self, path: &str) -> Result<String, GitError> {
        if !self.workdir.join(path).exists() {
            return Err(GitError::Diff {
                path: path.to_string(),
                message: "path no longer exists in the working tree".to_string(),
            });
        }

        let to_diff_error = |e: git2::Error| GitError::Diff {
            path: path.to_string(),
            message: e.message().to_string(),
        };

        let repo = self.repo()?;

        let mut opts = DiffOptions::new();
        opts.pathspec(path).disable_pathspec_match(true);

        let diff = repo
            .diff_index_to_workdir(None, Some(&mut opts))
            .map_err(to_diff_error)?;

        let text = render_patch(&diff).map_err(to_diff_error)?;

        debug!(path, diff_len = text.len(), "Captured file diff");

        Ok(text)
    }
}

/// Render a diff the way `git diff` prints it, minus the final newline
fn render_patch(diff: &Diff<'_>) -> Result<String, git2::Error> {
    let mut text = String::new();

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        match line.origin() {
            origin @ ('+' | '-' | ' ') => text.push(origin),
            _ => {}
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;

    if text.ends_with('\n') {
        text.pop();
    }

    Ok(text)
}
