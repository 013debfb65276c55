use std::time::Duration;

use super::ResolvedConfig;

pub(super) fn print_summary(config: &ResolvedConfig) {
	for line in summary_lines(config) {
		println!("{line}");
	}
}

fn summary_lines(config: &ResolvedConfig) -> Vec<String> {
	vec![
		"Effective configuration:".to_string(),
		format!("  Root: {}", config.root.display()),
		format!("  Render debounce: {}", millis(config.render.debounce)),
		format!("  Width bucket: {} columns", config.render.width_bucket),
		format!("  Renderer pool: {}", config.render.pool_capacity),
		format!("  Style: {}", config.render.style),
		format!("  Poll interval: {}", millis(config.watch.interval)),
		format!("  Reserved directory: {}", config.watch.reserved_dir),
		format!("  Log level: {}", config.logging.level),
		format!("  Log file: {}", config.logging.file.display()),
	]
}

fn millis(duration: Duration) -> String {
	format!("{} ms", duration.as_millis())
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use marginalia::logging::LoggingOptions;
	use marginalia::{RenderOptions, WatchOptions};

	use super::*;

	#[test]
	fn summary_lists_every_setting() {
		let config = ResolvedConfig {
			root: PathBuf::from("/notes"),
			render: RenderOptions::default(),
			watch: WatchOptions::default(),
			logging: LoggingOptions {
				level: "debug".into(),
				file: PathBuf::from("/tmp/marginalia.log"),
			},
		};

		let lines = summary_lines(&config);

		assert_eq!(lines[0], "Effective configuration:");
		assert!(lines.contains(&"  Render debounce: 500 ms".to_string()));
		assert!(lines.contains(&"  Style: dark".to_string()));
		assert!(lines.contains(&"  Poll interval: 2000 ms".to_string()));
		assert!(lines.contains(&"  Reserved directory: .marginalia".to_string()));
		assert!(lines.contains(&"  Log level: debug".to_string()));
	}
}
