use std::env;

use anyhow::{Error, Result};
use serde::Deserialize;

use crate::cli::CliArgs;

use super::resolved::{ConfigSources, ResolvedConfig, SettingSource};

mod logging;
mod notes;
mod render;
mod watch;

use logging::LoggingSection;
use notes::NotesSection;
use render::RenderSection;
use watch::WatchSection;

/// Mirror of the configuration file representation before CLI overrides and
/// validation are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawConfig {
	notes: NotesSection,
	render: RenderSection,
	watch: WatchSection,
	logging: LoggingSection,
}

impl RawConfig {
	/// Apply the shorthand environment variables that sit between config
	/// files and CLI flags.
	pub(super) fn apply_env_overrides(&mut self, style: Option<String>) {
		self.render.apply_env_overrides(style);
	}

	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		self.notes.apply_cli_overrides(cli);
		self.render.apply_cli_overrides(cli);
		self.watch.apply_cli_overrides(cli);
		self.logging.apply_cli_overrides(cli);
	}

	/// Convert the raw configuration into a [`ResolvedConfig`], validating and
	/// filling defaults where required.
	pub(super) fn resolve(self, cli: &CliArgs) -> Result<ResolvedConfig> {
		let sources = ConfigSources {
			width_bucket: detect_source(
				cli.width_bucket.is_some(),
				self.render.width_bucket.is_some(),
				&["MARGINALIA__RENDER__WIDTH_BUCKET"],
				"--width-bucket",
				"render.width_bucket",
			),
			pool_capacity: detect_source(
				cli.pool_capacity.is_some(),
				self.render.pool_capacity.is_some(),
				&["MARGINALIA__RENDER__POOL_CAPACITY"],
				"--pool-capacity",
				"render.pool_capacity",
			),
			style: detect_source(
				cli.style.is_some(),
				self.render.style.is_some(),
				&["MARGINALIA_STYLE", "MARGINALIA__RENDER__STYLE"],
				"--style",
				"render.style",
			),
			poll_interval: detect_source(
				cli.poll_interval_ms.is_some(),
				self.watch.interval_ms.is_some(),
				&["MARGINALIA__WATCH__INTERVAL_MS"],
				"--poll-interval-ms",
				"watch.interval_ms",
			),
			reserved_dir: detect_source(
				false,
				self.watch.reserved_dir.is_some(),
				&["MARGINALIA__WATCH__RESERVED_DIR"],
				"",
				"watch.reserved_dir",
			),
			log_level: detect_source(
				cli.log_level.is_some(),
				self.logging.level.is_some(),
				&["MARGINALIA__LOGGING__LEVEL"],
				"--log-level",
				"logging.level",
			),
		};

		let root = self.notes.resolve()?;
		let render = self.render.resolve(&sources).map_err(Error::new)?;
		let watch = self.watch.resolve();
		let logging = self.logging.resolve()?;

		let config = ResolvedConfig {
			root,
			render,
			watch,
			logging,
		};

		config.validate(&sources).map_err(Error::new)?;

		Ok(config)
	}
}

/// Work out where a value came from, checking `env_vars` in precedence order.
fn detect_source(
	cli_present: bool,
	value_present: bool,
	env_vars: &[&'static str],
	cli_flag: &'static str,
	key: &'static str,
) -> Option<SettingSource> {
	if !value_present {
		return None;
	}

	if cli_present {
		return Some(SettingSource::CliFlag(cli_flag));
	}

	if let Some(var) = env_vars.iter().copied().find(|var| env::var_os(var).is_some()) {
		return Some(SettingSource::Environment(var));
	}

	Some(SettingSource::ConfigKey(key))
}
