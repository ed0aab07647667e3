use git2::Status;
use serde::{Deserialize, Serialize};

/// Status of the git working tree, grouped by kind of change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStatus {
    /// Tracked files modified in the working tree (not yet staged)
    pub modified: Vec<String>,
    /// Files with changes recorded in the index
    pub staged: Vec<String>,
    pub deleted: Vec<String>,
    pub untracked: Vec<String>,
}

impl TreeStatus {
    /// Sort a single status entry into its buckets. One path can land in
    /// more than one bucket (e.g. staged and then modified again).
    pub(crate) fn record(&mut self, path: &str, status: Status) {
        if status.is_ignored() {
            return;
        }

        if status.is_wt_modified()
            || status.is_wt_typechange()
            || status.is_wt_renamed()
            || status.is_conflicted()
        {
            self.modified.push(path.to_string());
        }
        if status.is_index_new()
            || status.is_index_modified()
            || status.is_index_deleted()
            || status.is_index_renamed()
            || status.is_index_typechange()
        {
            self.staged.push(path.to_string());
        }
        if status.is_wt_deleted() {
            self.deleted.push(path.to_string());
        }
        if status.is_wt_new() {
            self.untracked.push(path.to_string());
        }
    }

    /// True when nothing is pending, untracked files included
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty()
            && self.staged.is_empty()
            && self.deleted.is_empty()
            && self.untracked.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.modified.len() + self.staged.len() + self.deleted.len() + self.untracked.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_status_is_clean() {
        let status = TreeStatus::default();
        assert!(status.is_clean());
        assert_eq!(status.total_changes(), 0);
    }

    #[test]
    fn test_untracked_only_is_dirty() {
        let mut status = TreeStatus::default();
        status.record("notes.txt", Status::WT_NEW);
        assert!(!status.is_clean());
        assert_eq!(status.untracked, vec!["notes.txt".to_string()]);
    }

    #[test]
    fn test_ignored_entries_are_dropped() {
        let mut status = TreeStatus::default();
        status.record("target/out.o", Status::IGNORED);
        assert!(status.is_clean());
    }

    #[test]
    fn test_staged_and_modified_counts_both() {
        let mut status = TreeStatus::default();
        status.record("src/lib.rs", Status::INDEX_MODIFIED | Status::WT_MODIFIED);
        assert_eq!(status.modified.len(), 1);
        assert_eq!(status.staged.len(), 1);
        assert_eq!(status.total_changes(), 2);
    }
}
