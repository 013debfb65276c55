use std::path::PathBuf;

use clap::{ArgAction, ColorChoice, Parser};

use super::styles::{cli_styles, long_version};

/// Command-line arguments accepted by the `marginalia` binary.
#[derive(Parser, Debug)]
#[command(
	name = "marginalia",
	version,
	long_version = long_version(),
	about = "Browse a directory of markdown notes with a live rendered preview",
	color = ColorChoice::Auto,
	styles = cli_styles()
)]
pub(crate) struct CliArgs {
	#[arg(
		short,
		long = "config",
		value_name = "FILE",
		env = "MARGINALIA_CONFIG",
		action = ArgAction::Append,
		help = "Additional configuration file to merge (default: none)"
	)]
	pub(crate) config: Vec<PathBuf>,
	#[arg(
		short = 'n',
		long = "no-config",
		help = "Skip loading default configuration files (default: disabled)"
	)]
	pub(crate) no_config: bool,
	#[arg(
		short = 'r',
		long,
		value_name = "PATH",
		help = "Directory holding the notes (default: current directory)"
	)]
	pub(crate) root: Option<PathBuf>,
	#[arg(
		long,
		value_name = "MS",
		help = "Delay before a requested render starts (default: 500)"
	)]
	pub(crate) debounce_ms: Option<u64>,
	#[arg(
		long,
		value_name = "COLUMNS",
		help = "Round the preview width down to a multiple of this (default: 20)"
	)]
	pub(crate) width_bucket: Option<u16>,
	#[arg(
		long,
		value_name = "COUNT",
		help = "Number of renderers kept alive, one per width (default: 8)"
	)]
	pub(crate) pool_capacity: Option<usize>,
	#[arg(
		short = 's',
		long,
		value_name = "STYLE",
		help = "Preview colour style: dark, light or notty (default: dark)"
	)]
	pub(crate) style: Option<String>,
	#[arg(
		long = "poll-interval-ms",
		value_name = "MS",
		help = "How often the notes tree is scanned for outside changes (default: 2000)"
	)]
	pub(crate) poll_interval_ms: Option<u64>,
	#[arg(
		long,
		value_name = "FILTER",
		help = "Log level or tracing filter directives (default: info)"
	)]
	pub(crate) log_level: Option<String>,
	#[arg(
		long,
		value_name = "FILE",
		help = "Where log lines are appended (default: marginalia.log in the cache directory)"
	)]
	pub(crate) log_file: Option<PathBuf>,
	#[arg(
		short = 'p',
		long = "print-config",
		help = "Print the effective configuration and exit (default: disabled)"
	)]
	pub(crate) print_config: bool,
}
