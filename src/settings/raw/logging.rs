use std::path::PathBuf;

use anyhow::Result;
use marginalia::app_dirs;
use marginalia::logging::LoggingOptions;
use serde::Deserialize;

use crate::cli::CliArgs;

const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct LoggingSection {
	pub(super) level: Option<String>,
	pub(super) file: Option<PathBuf>,
}

impl LoggingSection {
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(value) = cli.log_level.clone() {
			self.level = Some(value);
		}
		if let Some(value) = cli.log_file.clone() {
			self.file = Some(value);
		}
	}

	pub(super) fn resolve(self) -> Result<LoggingOptions> {
		let file = match self.file {
			Some(path) => path,
			None => app_dirs::default_log_file()?,
		};
		Ok(LoggingOptions {
			level: self
				.level
				.map(|level| level.trim().to_string())
				.unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
			file,
		})
	}
}
