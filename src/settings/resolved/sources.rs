use std::fmt;

/// Where a configuration value was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SettingSource {
	CliFlag(&'static str),
	Environment(&'static str),
	ConfigKey(&'static str),
}

impl fmt::Display for SettingSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::CliFlag(flag) => write!(f, "CLI flag `{flag}`"),
			Self::Environment(var) => write!(f, "environment variable `{var}`"),
			Self::ConfigKey(key) => write!(f, "configuration key `{key}`"),
		}
	}
}

/// Origins of the values validation can reject. `None` means the default
/// was used.
#[derive(Debug, Default, Clone)]
pub(crate) struct ConfigSources {
	pub(crate) width_bucket: Option<SettingSource>,
	pub(crate) pool_capacity: Option<SettingSource>,
	pub(crate) style: Option<SettingSource>,
	pub(crate) poll_interval: Option<SettingSource>,
	pub(crate) reserved_dir: Option<SettingSource>,
	pub(crate) log_level: Option<SettingSource>,
}

impl ConfigSources {
	pub(crate) fn source_for_width_bucket(&self) -> SettingSource {
		or_key(&self.width_bucket, "render.width_bucket")
	}

	pub(crate) fn source_for_pool_capacity(&self) -> SettingSource {
		or_key(&self.pool_capacity, "render.pool_capacity")
	}

	pub(crate) fn source_for_style(&self) -> SettingSource {
		or_key(&self.style, "render.style")
	}

	pub(crate) fn source_for_poll_interval(&self) -> SettingSource {
		or_key(&self.poll_interval, "watch.interval_ms")
	}

	pub(crate) fn source_for_reserved_dir(&self) -> SettingSource {
		or_key(&self.reserved_dir, "watch.reserved_dir")
	}

	pub(crate) fn source_for_log_level(&self) -> SettingSource {
		or_key(&self.log_level, "logging.level")
	}
}

fn or_key(source: &Option<SettingSource>, key: &'static str) -> SettingSource {
	source.clone().unwrap_or(SettingSource::ConfigKey(key))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_names_the_origin() {
		assert_eq!(
			SettingSource::CliFlag("--style").to_string(),
			"CLI flag `--style`"
		);
		assert_eq!(
			SettingSource::Environment("MARGINALIA_STYLE").to_string(),
			"environment variable `MARGINALIA_STYLE`"
		);
	}

	#[test]
	fn missing_sources_fall_back_to_config_keys() {
		let sources = ConfigSources::default();
		assert_eq!(
			sources.source_for_poll_interval(),
			SettingSource::ConfigKey("watch.interval_ms")
		);
	}
}
