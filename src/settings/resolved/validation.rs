use std::path::MAIN_SEPARATOR;

use marginalia::RenderStyle;
use marginalia::logging;

use super::{ConfigError, ConfigSources, ResolvedConfig};

/// Parse a style name, reporting where an unknown name came from.
pub(crate) fn parse_style(name: &str, sources: &ConfigSources) -> Result<RenderStyle, ConfigError> {
	RenderStyle::parse(name).ok_or_else(|| {
		ConfigError::invalid(
			"render.style",
			name,
			sources.source_for_style(),
			format!("expected one of {}", RenderStyle::NAMES.join(", ")),
		)
	})
}

pub(super) fn validate(config: &ResolvedConfig, sources: &ConfigSources) -> Result<(), ConfigError> {
	if config.render.width_bucket == 0 {
		return Err(ConfigError::invalid(
			"render.width_bucket",
			"0",
			sources.source_for_width_bucket(),
			"must be greater than zero",
		));
	}

	if config.render.pool_capacity == 0 {
		return Err(ConfigError::invalid(
			"render.pool_capacity",
			"0",
			sources.source_for_pool_capacity(),
			"must be greater than zero",
		));
	}

	if config.watch.interval.is_zero() {
		return Err(ConfigError::invalid(
			"watch.interval_ms",
			"0",
			sources.source_for_poll_interval(),
			"must be greater than zero",
		));
	}

	let reserved = &config.watch.reserved_dir;
	if reserved.is_empty() || reserved.contains(MAIN_SEPARATOR) || reserved.contains('/') {
		return Err(ConfigError::invalid(
			"watch.reserved_dir",
			reserved.as_str(),
			sources.source_for_reserved_dir(),
			"must be a single directory name",
		));
	}

	if let Err(err) = logging::filter_for(&config.logging.level) {
		return Err(ConfigError::invalid(
			"logging.level",
			config.logging.level.as_str(),
			sources.source_for_log_level(),
			err.to_string(),
		));
	}

	Ok(())
}
