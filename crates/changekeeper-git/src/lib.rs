//! # changekeeper-git
//!
//! Git operations for the changekeeper change monitor.
//!
//! This crate answers the three questions a scan pass asks of the
//! repository:
//! - Is anything pending at all (untracked files included)?
//! - Which tracked files differ from the index?
//! - What is the patch text for one of those files?
//!
//! ## Key Types
//!
//! - [`ChangeSource`] - The operations a scan pass consumes
//! - [`ChangeScanner`] - git2-backed implementation
//! - [`TreeStatus`] - Working tree status grouped by change kind
//!
//! ## Usage
//!
//! ```rust,ignore
//! use changekeeper_git::{ChangeScanner, ChangeSource};
//! use std::path::Path;
//!
//! let scanner = ChangeScanner::open(Path::new("."))?;
//!
//! if scanner.is_dirty()? {
//!     for path in scanner.changed_paths()? {
//!         let patch = scanner.diff_text(&path)?;
//!         println!("{}:\n{}", path, patch);
//!     }
//! }
//! ```
//!
//! ## Diff Format
//!
//! Patches are rendered in unified diff format, the same text
//! `git diff -- <path>` prints, without the final newline.

mod scanner;
mod status;

pub use scanner::{ChangeScanner, ChangeSource, GitError};
pub use status::TreeStatus;
