use std::time::Duration;

use marginalia::WatchOptions;
use marginalia::watch::{DEFAULT_POLL_INTERVAL, DEFAULT_RESERVED_DIR};
use serde::Deserialize;

use crate::cli::CliArgs;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct WatchSection {
	pub(super) interval_ms: Option<u64>,
	pub(super) reserved_dir: Option<String>,
}

impl WatchSection {
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(value) = cli.poll_interval_ms {
			self.interval_ms = Some(value);
		}
	}

	pub(super) fn resolve(self) -> WatchOptions {
		WatchOptions {
			interval: self
				.interval_ms
				.map(Duration::from_millis)
				.unwrap_or(DEFAULT_POLL_INTERVAL),
			reserved_dir: self
				.reserved_dir
				.map(|name| name.trim().to_string())
				.unwrap_or_else(|| DEFAULT_RESERVED_DIR.to_string()),
		}
	}
}
