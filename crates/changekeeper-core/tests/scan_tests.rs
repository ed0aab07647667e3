use std::fs;
use std::path::{Path, PathBuf};

use changekeeper_core::{
    Fingerprint, FingerprintStore, OutputLayout, ScanOutcome, ScanRunner, SkipReason,
};
use changekeeper_git::{ChangeScanner, ChangeSource};
use git2::{Repository, Signature};
use tempfile::TempDir;

/// Helper: a repository with the given files committed on HEAD.
fn create_test_repo(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let mut index = repo.index().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        index.add_path(Path::new(name)).unwrap();
    }
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Test", "test@example.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap();

    dir
}

fn runner_for(repo: &TempDir, out: &TempDir) -> ScanRunner<ChangeScanner> {
    let scanner = ChangeScanner::open(repo.path()).unwrap();
    ScanRunner::new(scanner, OutputLayout::new(out.path().join("Keeper_Of_Changes")))
}

fn batch_dirs(output: &Path) -> Vec<PathBuf> {
    if !output.exists() {
        return Vec::new();
    }
    let mut dirs: Vec<PathBuf> = fs::read_dir(output)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

// ============================================================
// Scenario: two modified files, empty store
// ============================================================

#[test]
fn test_first_pass_captures_every_modified_file() {
    let repo = create_test_repo(&[("a.txt", "one\n"), ("b.txt", "two\n")]);
    let out = TempDir::new().unwrap();
    fs::write(repo.path().join("a.txt"), "one\nfoo\n").unwrap();
    fs::write(repo.path().join("b.txt"), "two\nbar\n").unwrap();
    let runner = runner_for(&repo, &out);

    let outcome = runner.run_scan().unwrap();

    let layout = runner.layout();
    let dirs = batch_dirs(layout.base());
    assert_eq!(dirs.len(), 1);
    assert_eq!(outcome.batch_dir(), Some(dirs[0].as_path()));

    let diff_a = runner.source().diff_text("a.txt").unwrap();
    let diff_b = runner.source().diff_text("b.txt").unwrap();
    assert!(diff_a.ends_with("+foo"));
    assert_eq!(fs::read_to_string(dirs[0].join("a.txt.diff")).unwrap(), diff_a);
    assert_eq!(fs::read_to_string(dirs[0].join("b.txt.diff")).unwrap(), diff_b);

    let store = FingerprintStore::load(&layout.store_path()).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.lookup("a.txt"), Some(&Fingerprint::of(&diff_a)));
    assert_eq!(store.lookup("b.txt"), Some(&Fingerprint::of(&diff_b)));
}

#[test]
fn test_second_pass_without_edits_changes_nothing() {
    let repo = create_test_repo(&[("a.txt", "one\n"), ("b.txt", "two\n")]);
    let out = TempDir::new().unwrap();
    fs::write(repo.path().join("a.txt"), "one\nfoo\n").unwrap();
    fs::write(repo.path().join("b.txt"), "two\nbar\n").unwrap();
    let runner = runner_for(&repo, &out);

    assert!(runner.run_scan().unwrap().is_saved());
    let store_path = runner.layout().store_path();
    let store_bytes = fs::read(&store_path).unwrap();

    let outcome = runner.run_scan().unwrap();

    assert!(matches!(outcome, ScanOutcome::NoNewChanges { .. }));
    assert_eq!(batch_dirs(runner.layout().base()).len(), 1);
    assert_eq!(fs::read(&store_path).unwrap(), store_bytes);
}

#[test]
fn test_further_edit_is_captured_again() {
    let repo = create_test_repo(&[("a.txt", "one\n"), ("b.txt", "two\n")]);
    let out = TempDir::new().unwrap();
    fs::write(repo.path().join("a.txt"), "one\nfoo\n").unwrap();
    fs::write(repo.path().join("b.txt"), "two\nbar\n").unwrap();
    let runner = runner_for(&repo, &out);
    runner.run_scan().unwrap();

    fs::write(repo.path().join("a.txt"), "one\nfoo\nfoo again\n").unwrap();
    let outcome = runner.run_scan().unwrap();

    let captured: Vec<&str> = outcome.captured().iter().map(|s| s.path.as_str()).collect();
    assert_eq!(captured, vec!["a.txt"]);
    let snapshot = &outcome.captured()[0];
    assert!(fs::read_to_string(&snapshot.file)
        .unwrap()
        .ends_with("+foo again"));

    let store = FingerprintStore::load(&runner.layout().store_path()).unwrap();
    assert_eq!(store.lookup("a.txt"), Some(&snapshot.fingerprint));
}

// ============================================================
// Clean trees and skipped files
// ============================================================

#[test]
fn test_clean_repository_short_circuits() {
    let repo = create_test_repo(&[("a.txt", "one\n")]);
    let out = TempDir::new().unwrap();
    let runner = runner_for(&repo, &out);

    assert_eq!(runner.run_scan().unwrap(), ScanOutcome::Clean);
    assert!(!runner.layout().base().exists());
}

#[test]
fn test_untracked_files_are_not_snapshotted() {
    let repo = create_test_repo(&[("a.txt", "one\n")]);
    let out = TempDir::new().unwrap();
    fs::write(repo.path().join("scratch.txt"), "not tracked\n").unwrap();
    let runner = runner_for(&repo, &out);

    let outcome = runner.run_scan().unwrap();

    assert!(matches!(outcome, ScanOutcome::NoNewChanges { .. }));
    assert!(batch_dirs(runner.layout().base()).is_empty());
}

#[test]
fn test_deleted_file_is_skipped_others_saved() {
    let repo = create_test_repo(&[("a.txt", "one\n"), ("b.txt", "two\n")]);
    let out = TempDir::new().unwrap();
    fs::remove_file(repo.path().join("a.txt")).unwrap();
    fs::write(repo.path().join("b.txt"), "two\nbar\n").unwrap();
    let runner = runner_for(&repo, &out);

    let outcome = runner.run_scan().unwrap();

    assert_eq!(outcome.skipped().len(), 1);
    assert_eq!(outcome.skipped()[0].path, "a.txt");
    assert_eq!(outcome.skipped()[0].reason, SkipReason::Missing);
    assert_eq!(outcome.captured().len(), 1);
    assert_eq!(outcome.captured()[0].path, "b.txt");

    let store = FingerprintStore::load(&runner.layout().store_path()).unwrap();
    assert!(store.lookup("a.txt").is_none());
}

#[test]
fn test_path_with_spaces_round_trips_through_store() {
    let repo = create_test_repo(&[("notes/my draft.md", "v1\n")]);
    let out = TempDir::new().unwrap();
    fs::write(repo.path().join("notes/my draft.md"), "v1\nv2\n").unwrap();
    let runner = runner_for(&repo, &out);

    let first = runner.run_scan().unwrap();
    assert!(first
        .batch_dir()
        .unwrap()
        .join("my draft.md.diff")
        .exists());

    let second = runner.run_scan().unwrap();
    assert!(matches!(second, ScanOutcome::NoNewChanges { .. }));
}
