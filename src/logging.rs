//! File-backed `tracing` setup.
//!
//! The terminal is owned by the UI, so log lines always go to a file.
//! `MARGINALIA_LOG` takes filter directives that replace the configured level.

use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "MARGINALIA_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
	/// Filter directives, e.g. `info` or `marginalia::render=debug`.
	pub level: String,
	pub file: PathBuf,
}

#[derive(Debug, Error)]
pub enum LoggingError {
	#[error("invalid log filter {directives:?}: {reason}")]
	Filter { directives: String, reason: String },
	#[error("failed to open log file {}: {source}", path.display())]
	Open {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("failed to install tracing subscriber: {0}")]
	Install(String),
}

/// Parse filter directives the way [`initialize`] will.
pub fn filter_for(directives: &str) -> Result<EnvFilter, LoggingError> {
	EnvFilter::try_new(directives).map_err(|err| LoggingError::Filter {
		directives: directives.to_string(),
		reason: err.to_string(),
	})
}

fn effective_directives(level: &str, env_override: Option<String>) -> String {
	env_override
		.filter(|value| !value.trim().is_empty())
		.unwrap_or_else(|| level.to_string())
}

/// Install the global subscriber writing to `options.file`.
pub fn initialize(options: &LoggingOptions) -> Result<(), LoggingError> {
	let directives = effective_directives(&options.level, env::var(LOG_ENV).ok());
	let filter = filter_for(&directives)?;

	let open_error = |source| LoggingError::Open {
		path: options.file.clone(),
		source,
	};
	if let Some(parent) = options.file.parent()
		&& !parent.as_os_str().is_empty()
	{
		fs::create_dir_all(parent).map_err(open_error)?;
	}
	let file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(&options.file)
		.map_err(open_error)?;

	let fmt_layer = fmt::layer()
		.with_ansi(false)
		.with_target(true)
		.with_writer(Mutex::new(file));

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt_layer)
		.try_init()
		.map_err(|err| LoggingError::Install(err.to_string()))
}
