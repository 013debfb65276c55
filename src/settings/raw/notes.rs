use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::cli::CliArgs;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct NotesSection {
	pub(super) root: Option<PathBuf>,
}

impl NotesSection {
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(root) = cli.root.clone() {
			self.root = Some(root);
		}
	}

	/// Canonical notes directory, defaulting to the working directory.
	pub(super) fn resolve(self) -> Result<PathBuf> {
		let mut root = match self.root {
			Some(path) => path,
			None => env::current_dir().context("failed to determine working directory")?,
		};
		if root.is_relative() {
			root = env::current_dir()
				.context("failed to resolve current directory for root")?
				.join(root);
		}
		root = fs::canonicalize(&root)
			.with_context(|| format!("failed to canonicalize notes root {}", root.display()))?;

		let metadata = fs::metadata(&root)
			.with_context(|| format!("failed to inspect notes root {}", root.display()))?;
		ensure!(
			metadata.is_dir(),
			"notes root {} must be a directory",
			root.display()
		);

		Ok(root)
	}
}
