use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structured log events for the change monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    MonitorStarted {
        repo_path: PathBuf,
        output_path: PathBuf,
        interval_secs: u64,
    },
    ScanStarted {
        pass: usize,
        /// Local wall-clock time, `%Y-%m-%d %H:%M:%S`
        checked_at: String,
    },
    /// Working tree has nothing pending, untracked files included
    NoChangesDetected {
        pass: usize,
    },
    FileSkipped {
        pass: usize,
        path: String,
        reason: String,
    },
    SnapshotWritten {
        pass: usize,
        path: String,
        file: PathBuf,
    },
    ChangesSaved {
        pass: usize,
        batch_dir: PathBuf,
        files: usize,
    },
    NoNewChanges {
        pass: usize,
        unchanged: usize,
    },
    ScanFailed {
        pass: usize,
        error: String,
    },
    MonitorStopped {
        passes: usize,
        batches: usize,
        failed_passes: usize,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for monitor events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::MonitorStarted {
                repo_path,
                output_path,
                interval_secs,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "changekeeper".bold().bright_white(),
                    " ".repeat(55) + &"│".bright_blue().to_string()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Repo:".dimmed(),
                    Self::truncate_with_padding(&repo_path.display().to_string(), 60, 66)
                        .dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Output:".dimmed(),
                    Self::truncate_with_padding(&output_path.display().to_string(), 58, 64)
                        .dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Every:".dimmed(),
                    Self::truncate_with_padding(&format!("{}s", interval_secs), 59, 65).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::ScanStarted { checked_at, .. } => {
                let _ = writeln!(
                    stderr,
                    "{} {}",
                    "▶".bright_cyan(),
                    format!("Checking for changes: {}", checked_at).bold()
                );
            }
            LogEvent::NoChangesDetected { .. } => {
                let _ = writeln!(stderr, "  {}", "No changes detected.".dimmed());
            }
            LogEvent::FileSkipped { path, reason, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {}",
                    "⚠".bright_yellow(),
                    path.yellow(),
                    format!("({})", reason).dimmed()
                );
            }
            LogEvent::SnapshotWritten { path, .. } => {
                let _ = writeln!(stderr, "  {} {}", "+".bright_green(), path);
            }
            LogEvent::ChangesSaved {
                batch_dir, files, ..
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} Changes saved in folder: {} ({} {})",
                    "✓".bright_green(),
                    batch_dir.display().to_string().bright_green(),
                    files,
                    if *files == 1 { "file" } else { "files" }
                );
            }
            LogEvent::NoNewChanges { .. } => {
                let _ = writeln!(stderr, "  {}", "No new changes to save.".dimmed());
            }
            LogEvent::ScanFailed { error, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} Scan failed: {}",
                    "✗".bright_red(),
                    error.bright_red()
                );
            }
            LogEvent::MonitorStopped {
                passes,
                batches,
                failed_passes,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} Stopped after {} {}: {} {} written, {} failed",
                    "■".bright_blue(),
                    passes,
                    if *passes == 1 { "pass" } else { "passes" },
                    batches,
                    if *batches == 1 { "batch" } else { "batches" },
                    failed_passes
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::MonitorStarted {
                repo_path,
                interval_secs,
                ..
            } => format!(
                "[{}] monitor:start {} every={}s",
                timestamp,
                repo_path.display(),
                interval_secs
            ),
            LogEvent::ScanStarted { pass, .. } => format!("[{}] scan:start:{}", timestamp, pass),
            LogEvent::NoChangesDetected { pass } => format!("[{}] scan:clean:{}", timestamp, pass),
            LogEvent::FileSkipped { pass, path, reason } => {
                format!("[{}] skip:{} {} ({})", timestamp, pass, path, reason)
            }
            LogEvent::SnapshotWritten { .. } => return, // Summarized by changes_saved
            LogEvent::ChangesSaved {
                pass,
                batch_dir,
                files,
            } => format!(
                "[{}] scan:saved:{} {}f {}",
                timestamp,
                pass,
                files,
                batch_dir.display()
            ),
            LogEvent::NoNewChanges { pass, unchanged } => {
                format!("[{}] scan:unchanged:{} {}f", timestamp, pass, unchanged)
            }
            LogEvent::ScanFailed { pass, error } => {
                format!("[{}] error:{}:{}", timestamp, pass, error)
            }
            LogEvent::MonitorStopped {
                passes,
                batches,
                failed_passes,
            } => format!(
                "[{}] monitor:stop passes={} batches={} failed={}",
                timestamp, passes, batches, failed_passes
            ),
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let truncated = if s.chars().count() > max_len {
            let kept: String = s.chars().take(max_len - 3).collect();
            format!("{}...", kept)
        } else {
            s.to_string()
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1); // +1 for trailing │
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}
