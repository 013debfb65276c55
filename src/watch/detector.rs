use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{Snapshot, WatchError, WatchOptions};

/// Position of the detector within one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchState {
	#[default]
	Idle,
	Scanning,
	Comparing,
	Stable,
	Changed,
}

#[derive(Debug)]
pub enum TickOutcome {
	/// First successful scan; stored without triggering anything.
	Baseline,
	Unchanged,
	/// The tree differs from the baseline, which has been replaced.
	Changed,
	/// The scan failed and the baseline was kept.
	ScanFailed(WatchError),
}

impl TickOutcome {
	pub fn is_changed(&self) -> bool {
		matches!(self, Self::Changed)
	}
}

/// Tick-driven poller comparing whole-tree snapshots.
///
/// The detector never schedules anything itself: the caller runs [`tick`]
/// whenever its timer fires and then arms the next one with the duration
/// returned by [`next_tick`].
///
/// [`tick`]: ChangeDetector::tick
/// [`next_tick`]: ChangeDetector::next_tick
#[derive(Debug)]
pub struct ChangeDetector {
	root: PathBuf,
	reserved: String,
	interval: Duration,
	state: WatchState,
	baseline: Option<Snapshot>,
}

impl ChangeDetector {
	pub fn new(root: impl Into<PathBuf>, options: &WatchOptions) -> Self {
		Self {
			root: root.into(),
			reserved: options.reserved_dir.clone(),
			interval: options.interval,
			state: WatchState::Idle,
			baseline: None,
		}
	}

	pub fn tick(&mut self) -> TickOutcome {
		self.state = WatchState::Scanning;
		let snapshot = match Snapshot::scan(&self.root, &self.reserved) {
			Ok(snapshot) => snapshot,
			Err(err) => {
				warn!(root = %self.root.display(), error = %err, "watch scan failed");
				self.state = WatchState::Idle;
				return TickOutcome::ScanFailed(err);
			}
		};

		self.state = WatchState::Comparing;
		match self.baseline.as_ref() {
			None => {
				debug!(entries = snapshot.len(), "watch baseline established");
				self.baseline = Some(snapshot);
				self.state = WatchState::Stable;
				TickOutcome::Baseline
			}
			Some(baseline) if *baseline == snapshot => {
				self.state = WatchState::Stable;
				TickOutcome::Unchanged
			}
			Some(_) => {
				info!(entries = snapshot.len(), "external filesystem change detected");
				self.baseline = Some(snapshot);
				self.state = WatchState::Changed;
				TickOutcome::Changed
			}
		}
	}

	/// Finish the current cycle and return the delay before the next tick.
	pub fn next_tick(&mut self) -> Duration {
		self.state = WatchState::Idle;
		self.interval
	}

	pub fn state(&self) -> WatchState {
		self.state
	}

	pub fn baseline(&self) -> Option<&Snapshot> {
		self.baseline.as_ref()
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}
}
