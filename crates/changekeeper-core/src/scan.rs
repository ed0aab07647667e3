use tracing::{debug, info, warn};

use changekeeper_git::ChangeSource;

use crate::config::OutputLayout;
use crate::error::KeeperError;
use crate::outcome::{ScanOutcome, SkipReason, SkippedFile};
use crate::snapshot::{Snapshot, SnapshotWriter};
use crate::store::FingerprintStore;

/// What happened to one changed file within a pass
enum FileResult {
    Captured(Snapshot),
    Unchanged,
    Skipped(SkipReason),
}

/// Runs single scan passes: list changes, fingerprint them, snapshot the
/// novel ones and persist their fingerprints.
pub struct ScanRunner<S> {
    source: S,
    layout: OutputLayout,
}

impl<S: ChangeSource> ScanRunner<S> {
    pub fn new(source: S, layout: OutputLayout) -> Self {
        Self { source, layout }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Run one scan pass.
    ///
    /// Per-file problems (missing file, failed diff) are reported in the
    /// outcome and never stop the pass. Repository and store errors do.
    pub fn run_scan(&self) -> Result<ScanOutcome, KeeperError> {
        if !self.source.is_dirty()? {
            info!("No changes detected");
            return Ok(ScanOutcome::Clean);
        }

        let mut store = FingerprintStore::load(&self.layout.store_path())?;
        let mut writer = SnapshotWriter::new(self.layout.base());

        let mut captured = Vec::new();
        let mut unchanged = Vec::new();
        let mut skipped = Vec::new();

        for path in self.source.changed_paths()? {
            if path.is_empty() {
                continue;
            }

            match self.process_file(&path, &store, &mut writer)? {
                FileResult::Captured(snapshot) => captured.push(snapshot),
                FileResult::Unchanged => unchanged.push(path),
                FileResult::Skipped(reason) => {
                    warn!(path = %path, reason = %reason, "Skipping changed file");
                    skipped.push(SkippedFile { path, reason });
                }
            }
        }

        let Some(batch_dir) = writer.into_batch() else {
            info!(unchanged = unchanged.len(), "No new changes to save");
            return Ok(ScanOutcome::NoNewChanges { unchanged, skipped });
        };

        store.merge(
            captured
                .iter()
                .map(|snapshot| (snapshot.path.clone(), snapshot.fingerprint.clone())),
        );
        store.save()?;

        info!(
            batch = %batch_dir.display(),
            files = captured.len(),
            "Changes saved"
        );

        Ok(ScanOutcome::Saved {
            batch_dir,
            captured,
            unchanged,
            skipped,
        })
    }

    fn process_file(
        &self,
        path: &str,
        store: &FingerprintStore,
        writer: &mut SnapshotWriter,
    ) -> Result<FileResult, KeeperError> {
        if !self.source.workdir().join(path).exists() {
            return Ok(FileResult::Skipped(SkipReason::Missing));
        }

        let diff_text = match self.source.diff_text(path) {
            Ok(text) => text,
            Err(e) => return Ok(FileResult::Skipped(SkipReason::Diff(e.to_string()))),
        };

        match writer.maybe_snapshot(path, &diff_text, store.lookup(path))? {
            Some(snapshot) => Ok(FileResult::Captured(snapshot)),
            None => {
                debug!(path, "Unchanged since last snapshot");
                Ok(FileResult::Unchanged)
            }
        }
    }
}
