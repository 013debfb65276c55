mod cli;
mod settings;
mod workflow;

use anyhow::Result;
use cli::parse_cli;
use workflow::NotesWorkflow;

fn main() -> Result<()> {
	let cli = parse_cli();
	let resolved = settings::load(&cli)?;

	if cli.print_config {
		resolved.print_summary();
		return Ok(());
	}

	marginalia::logging::initialize(&resolved.logging)?;
	NotesWorkflow::from_config(resolved).run()
}
