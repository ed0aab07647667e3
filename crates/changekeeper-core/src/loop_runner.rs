use chrono::Local;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use changekeeper_git::ChangeSource;
use changekeeper_logging::{LogEvent, Logger};

use crate::config::MonitorConfig;
use crate::error::KeeperError;
use crate::outcome::{MonitorSummary, ScanOutcome};
use crate::scan::ScanRunner;
use crate::store::FingerprintStore;

/// Repeats scan passes at a fixed interval until cancelled
pub struct Monitor<S> {
    runner: ScanRunner<S>,
    config: MonitorConfig,
    logger: Arc<Logger>,
}

impl<S: ChangeSource> Monitor<S> {
    pub fn new(source: S, config: MonitorConfig, logger: Arc<Logger>) -> Self {
        Self {
            runner: ScanRunner::new(source, config.layout.clone()),
            config,
            logger,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run passes until `cancel` fires or the configured pass limit is hit.
    ///
    /// Only a failure to prepare the output directory is returned as an
    /// error; failed passes are logged and counted in the summary.
    pub async fn run(&self, cancel: CancellationToken) -> Result<MonitorSummary, KeeperError> {
        let layout = &self.config.layout;
        FingerprintStore::ensure_exists(layout.base(), &layout.store_path())?;

        self.logger.log(&LogEvent::MonitorStarted {
            repo_path: self.config.repo_path.clone(),
            output_path: layout.base().to_path_buf(),
            interval_secs: self.config.interval.as_secs(),
        });

        let mut summary = MonitorSummary::default();

        loop {
            if cancel.is_cancelled() {
                info!("Monitor cancelled");
                summary.cancelled = true;
                break;
            }

            if !self.config.should_continue(summary.passes) {
                debug!(passes = summary.passes, "Pass limit reached");
                break;
            }

            self.run_pass(&mut summary);

            if !self.config.should_continue(summary.passes) {
                continue;
            }

            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        self.logger.log(&LogEvent::MonitorStopped {
            passes: summary.passes,
            batches: summary.batches,
            failed_passes: summary.failed_passes,
        });

        Ok(summary)
    }

    fn run_pass(&self, summary: &mut MonitorSummary) {
        summary.passes += 1;
        let pass = summary.passes;

        self.logger.log(&LogEvent::ScanStarted {
            pass,
            checked_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        });

        match self.runner.run_scan() {
            Ok(outcome) => {
                if outcome.is_saved() {
                    summary.batches += 1;
                }
                self.report(pass, &outcome);
            }
            Err(e) => {
                warn!(pass, error = %e, "Scan pass failed");
                summary.failed_passes += 1;
                self.logger.log(&LogEvent::ScanFailed {
                    pass,
                    error: e.to_string(),
                });
            }
        }
    }

    fn report(&self, pass: usize, outcome: &ScanOutcome) {
        for skipped in outcome.skipped() {
            self.logger.log(&LogEvent::FileSkipped {
                pass,
                path: skipped.path.clone(),
                reason: skipped.reason.to_string(),
            });
        }

        match outcome {
            ScanOutcome::Clean => {
                self.logger.log(&LogEvent::NoChangesDetected { pass });
            }
            ScanOutcome::NoNewChanges { unchanged, .. } => {
                self.logger.log(&LogEvent::NoNewChanges {
                    pass,
                    unchanged: unchanged.len(),
                });
            }
            ScanOutcome::Saved {
                batch_dir,
                captured,
                ..
            } => {
                for snapshot in captured {
                    self.logger.log(&LogEvent::SnapshotWritten {
                        pass,
                        path: snapshot.path.clone(),
                        file: snapshot.file.clone(),
                    });
                }
                self.logger.log(&LogEvent::ChangesSaved {
                    pass,
                    batch_dir: batch_dir.clone(),
                    files: captured.len(),
                });
            }
        }
    }
}
