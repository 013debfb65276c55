use anyhow::Result;
use marginalia::App;
use tracing::{error, info};

use crate::settings::ResolvedConfig;

/// Coordinates building and running the interactive notes browser.
pub(crate) struct NotesWorkflow {
	app: App,
}

impl NotesWorkflow {
	pub(crate) fn from_config(config: ResolvedConfig) -> Self {
		let ResolvedConfig {
			root,
			render,
			watch,
			logging: _,
		} = config;

		info!(
			root = %root.display(),
			width_bucket = render.width_bucket,
			pool_capacity = render.pool_capacity,
			style = %render.style,
			poll_interval_ms = watch.interval.as_millis() as u64,
			"starting notes browser"
		);
		let app = App::new(root, &render, &watch);
		Self { app }
	}

	pub(crate) fn run(mut self) -> Result<()> {
		let outcome = self.app.run();
		match &outcome {
			Ok(()) => info!("notes browser exited"),
			Err(err) => error!(error = %err, "notes browser failed"),
		}
		outcome
	}
}
