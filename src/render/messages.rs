use std::path::PathBuf;
use std::time::SystemTime;

use super::RenderError;

/// A render scheduled by the debounce timer.
///
/// The generation is fixed when the request is created and is never reused;
/// it is the only thing used to decide whether the result is still wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
	pub path: PathBuf,
	pub width: u16,
	pub generation: u64,
}

/// Output of a background render, sent back to the interactive loop.
#[derive(Debug)]
pub struct RenderResult {
	pub path: PathBuf,
	pub width: u16,
	pub generation: u64,
	pub output: String,
	pub raw: String,
	/// Modification time observed before the source was read.
	pub modified: Option<SystemTime>,
	pub failure: Option<RenderError>,
}

impl RenderResult {
	pub(super) fn failed(request: RenderRequest, error: RenderError) -> Self {
		Self {
			path: request.path,
			width: request.width,
			generation: request.generation,
			output: String::new(),
			raw: String::new(),
			modified: None,
			failure: Some(error),
		}
	}

	pub fn is_failure(&self) -> bool {
		self.failure.is_some()
	}
}
