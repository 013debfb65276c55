use std::time::Duration;

use marginalia::RenderOptions;
use marginalia::render::{DEFAULT_DEBOUNCE, DEFAULT_POOL_CAPACITY, DEFAULT_WIDTH_BUCKET};
use serde::Deserialize;

use crate::cli::CliArgs;

use super::super::resolved::{ConfigError, ConfigSources, parse_style};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RenderSection {
	pub(super) debounce_ms: Option<u64>,
	pub(super) width_bucket: Option<u16>,
	pub(super) pool_capacity: Option<usize>,
	pub(super) style: Option<String>,
}

impl RenderSection {
	pub(super) fn apply_env_overrides(&mut self, style: Option<String>) {
		if let Some(style) = style.filter(|value| !value.trim().is_empty()) {
			self.style = Some(style);
		}
	}

	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(value) = cli.debounce_ms {
			self.debounce_ms = Some(value);
		}
		if let Some(value) = cli.width_bucket {
			self.width_bucket = Some(value);
		}
		if let Some(value) = cli.pool_capacity {
			self.pool_capacity = Some(value);
		}
		if let Some(value) = cli.style.clone() {
			self.style = Some(value);
		}
	}

	pub(super) fn resolve(self, sources: &ConfigSources) -> Result<RenderOptions, ConfigError> {
		let style = match self.style {
			Some(name) => parse_style(&name, sources)?,
			None => Default::default(),
		};

		Ok(RenderOptions {
			debounce: self
				.debounce_ms
				.map(Duration::from_millis)
				.unwrap_or(DEFAULT_DEBOUNCE),
			width_bucket: self.width_bucket.unwrap_or(DEFAULT_WIDTH_BUCKET),
			pool_capacity: self.pool_capacity.unwrap_or(DEFAULT_POOL_CAPACITY),
			style,
		})
	}
}
