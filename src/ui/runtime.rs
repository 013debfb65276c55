use std::env;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};
use std::time::Duration;

use anyhow::Result;
use ratatui::DefaultTerminal;
use tracing::{info, warn};

use super::App;
use super::actions::Control;
use super::events::InputPump;
use crate::render::Display;

/// Redraw cadence while idle; also drives the spinner.
const FRAME: Duration = Duration::from_millis(80);
const FALLBACK_EDITOR: &str = "vi";

/// External editor owning the terminal.
struct EditorSession {
	path: PathBuf,
	child: Child,
}

impl App {
	/// Take over the terminal and pump events until the user quits.
	pub fn run(&mut self) -> Result<()> {
		let mut terminal = ratatui::init();
		let result = self.run_with(&mut terminal);
		ratatui::restore();
		result
	}

	fn run_with(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
		terminal.clear()?;
		let size = terminal.size()?;
		self.resize(size.width);
		self.start();

		let input = InputPump::spawn(self.sender())?;
		let outcome = self.event_loop(terminal, &input);
		let stopped = input.stop();
		outcome.and(stopped)
	}

	fn event_loop(&mut self, terminal: &mut DefaultTerminal, input: &InputPump) -> Result<()> {
		let mut editor: Option<EditorSession> = None;

		loop {
			let finished = match editor.as_mut() {
				Some(session) => session.child.try_wait()?,
				None => None,
			};
			if let Some(status) = finished
				&& let Some(session) = editor.take()
			{
				self.finish_edit(terminal, input, session.path, status)?;
			}
			if editor.is_none() {
				terminal.draw(|frame| self.draw(frame))?;
			}

			let mut control = match self.next_event(FRAME) {
				Some(event) => self.handle_event(event),
				None => Control::Continue,
			};
			while control == Control::Continue {
				let Some(event) = self.try_next_event() else {
					break;
				};
				control = self.handle_event(event);
			}

			match control {
				Control::Continue => {}
				Control::Quit => return Ok(()),
				Control::Edit(path) => editor = self.begin_edit(terminal, input, path)?,
			}

			if matches!(self.scheduler.display(), Display::Placeholder { .. }) {
				self.throbber_state.calc_next();
			}
		}
	}

	fn begin_edit(
		&mut self,
		terminal: &mut DefaultTerminal,
		input: &InputPump,
		path: PathBuf,
	) -> Result<Option<EditorSession>> {
		let (program, args) = editor_command(env::var("VISUAL").ok(), env::var("EDITOR").ok());
		input.pause();
		ratatui::restore();

		match Command::new(&program).args(&args).arg(&path).spawn() {
			Ok(child) => {
				info!(path = %path.display(), editor = %program, "opened note in editor");
				self.workspace.editing = Some(path.clone());
				Ok(Some(EditorSession { path, child }))
			}
			Err(err) => {
				warn!(editor = %program, error = %err, "failed to launch editor");
				*terminal = ratatui::init();
				terminal.clear()?;
				input.resume();
				self.status = format!("Could not launch {program}: {err}");
				Ok(None)
			}
		}
	}

	fn finish_edit(
		&mut self,
		terminal: &mut DefaultTerminal,
		input: &InputPump,
		path: PathBuf,
		status: ExitStatus,
	) -> Result<()> {
		*terminal = ratatui::init();
		terminal.clear()?;
		input.resume();
		self.workspace.editing = None;

		let label = self.workspace.notes.label(&path);
		self.status = if status.success() {
			format!("Edited {label}")
		} else {
			format!("Editor exited with {status}")
		};
		info!(path = %path.display(), %status, "editor session finished");

		self.workspace.notes.rebuild();
		self.refresh();
		Ok(())
	}
}

/// Split the first non-empty editor setting into program and arguments.
fn editor_command(visual: Option<String>, editor: Option<String>) -> (String, Vec<String>) {
	let command = [visual, editor]
		.into_iter()
		.flatten()
		.find(|value| !value.trim().is_empty())
		.unwrap_or_else(|| FALLBACK_EDITOR.to_string());

	let mut parts = command.split_whitespace().map(str::to_string);
	let program = parts.next().unwrap_or_else(|| FALLBACK_EDITOR.to_string());
	(program, parts.collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::render::RenderOptions;
	use crate::ui::AppEvent;
	use crate::watch::WatchOptions;

	#[test]
	fn visual_wins_over_editor() {
		let (program, args) = editor_command(Some("code -w".into()), Some("nano".into()));
		assert_eq!(program, "code");
		assert_eq!(args, vec!["-w".to_string()]);
	}

	#[test]
	fn blank_settings_fall_back() {
		let (program, args) = editor_command(Some("  ".into()), None);
		assert_eq!(program, FALLBACK_EDITOR);
		assert!(args.is_empty());

		let (program, _) = editor_command(None, Some("hx".into()));
		assert_eq!(program, "hx");
	}

	#[test]
	fn events_flow_through_the_channel() {
		let dir = tempfile::tempdir().unwrap();
		let app = App::new(dir.path(), &RenderOptions::default(), &WatchOptions::default());
		app.sender().send(AppEvent::WatchTick).unwrap();
		assert!(matches!(app.try_next_event(), Some(AppEvent::WatchTick)));
	}
}
