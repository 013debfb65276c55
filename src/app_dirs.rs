//! Resolve the configuration and cache directories for `marginalia`.
//!
//! Environment overrides win over the platform locations provided by the
//! `directories` crate.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use directories::ProjectDirs;

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "marginalia";
const APPLICATION: &str = "marginalia";

const CONFIG_DIR_ENV: &str = "MARGINALIA_CONFIG_DIR";
const CACHE_DIR_ENV: &str = "MARGINALIA_CACHE_DIR";

/// File name of the log written below the cache directory.
pub const LOG_FILE_NAME: &str = "marginalia.log";

fn project_dirs() -> Result<ProjectDirs> {
	ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
		.ok_or_else(|| anyhow!("unable to determine home directory for marginalia"))
}

/// An empty value counts as unset.
fn non_empty(value: Option<OsString>) -> Option<PathBuf> {
	value.filter(|value| !value.is_empty()).map(PathBuf::from)
}

/// Directory holding `config.toml`.
pub fn get_config_dir() -> Result<PathBuf> {
	if let Some(dir) = non_empty(env::var_os(CONFIG_DIR_ENV)) {
		return Ok(dir);
	}
	Ok(project_dirs()?.config_local_dir().to_path_buf())
}

pub fn get_cache_dir() -> Result<PathBuf> {
	if let Some(dir) = non_empty(env::var_os(CACHE_DIR_ENV)) {
		return Ok(dir);
	}
	Ok(project_dirs()?.cache_dir().to_path_buf())
}

/// Default location of the log file.
pub fn default_log_file() -> Result<PathBuf> {
	Ok(get_cache_dir()?.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_override_is_ignored() {
		assert_eq!(non_empty(Some(OsString::new())), None);
		assert_eq!(non_empty(None), None);
		assert_eq!(
			non_empty(Some(OsString::from("/tmp/notes"))),
			Some(PathBuf::from("/tmp/notes"))
		);
	}
}
