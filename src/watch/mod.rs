//! Polling change detection for the notes tree.
//!
//! The detector compares whole-tree snapshots on a fixed interval. Any
//! difference triggers [`apply_external_change`], which clears the render
//! cache and notifies the workspace collaborators.

mod detector;
mod invalidate;
mod snapshot;

use std::time::Duration;

pub use detector::{ChangeDetector, TickOutcome, WatchState};
pub use invalidate::{ExternalChange, WorkspaceHooks, apply_external_change};
pub use snapshot::{EntryStat, Snapshot, WatchError};

/// Delay between two snapshot scans.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Directory name excluded from snapshots at any depth.
pub const DEFAULT_RESERVED_DIR: &str = ".marginalia";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
	pub interval: Duration,
	/// Name of the internal metadata directory that never counts as a change.
	pub reserved_dir: String,
}

impl Default for WatchOptions {
	fn default() -> Self {
		Self {
			interval: DEFAULT_POLL_INTERVAL,
			reserved_dir: DEFAULT_RESERVED_DIR.to_string(),
		}
	}
}
