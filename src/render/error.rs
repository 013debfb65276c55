use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while producing a preview.
#[derive(Debug, Error)]
pub enum RenderError {
	#[error("failed to inspect {}: {source}", .path.display())]
	Stat {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("failed to read {}: {source}", .path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("failed to construct renderer for width {width}: {reason}")]
	Construct { width: u16, reason: String },
	#[error("failed to convert document: {0}")]
	Convert(String),
}

impl RenderError {
	/// Returns `true` for failures that originate from I/O or engine setup
	/// rather than from converting the document itself.
	pub fn is_io(&self) -> bool {
		matches!(
			self,
			Self::Stat { .. } | Self::Read { .. } | Self::Construct { .. }
		)
	}
}
