use std::path::PathBuf;

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::App;
use super::events::AppEvent;
use crate::render::Display;

/// What the runtime should do after an event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Control {
	Continue,
	Quit,
	/// Suspend the terminal and open the note in an external editor.
	Edit(PathBuf),
}

const DEFAULT_PAGE: u16 = 10;

impl App {
	pub(crate) fn handle_event(&mut self, event: AppEvent) -> Control {
		match event {
			AppEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
				return self.handle_key(key);
			}
			AppEvent::Input(Event::Resize(columns, _)) => self.resize(columns),
			AppEvent::Input(_) => {}
			AppEvent::RenderDue(request) => self.handle_render_due(request),
			AppEvent::RenderDone(result) => self.handle_render_done(result),
			AppEvent::WatchTick => self.handle_watch_tick(),
		}
		Control::Continue
	}

	pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Control {
		if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
			return Control::Quit;
		}
		if self.filter_input {
			self.handle_filter_key(key);
			return Control::Continue;
		}
		match key.code {
			KeyCode::Esc if !self.query.is_empty() => self.clear_filter(),
			KeyCode::Char('q') | KeyCode::Esc => return Control::Quit,
			KeyCode::Char('/') => self.filter_input = true,
			KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
			KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
			KeyCode::Char('g') | KeyCode::Home => {
				if self.workspace.notes.select_first() {
					self.show_selected();
				}
			}
			KeyCode::Char('G') | KeyCode::End => {
				if self.workspace.notes.select_last() {
					self.show_selected();
				}
			}
			KeyCode::PageDown => self.scroll_preview(self.page() as i32),
			KeyCode::PageUp => self.scroll_preview(-(self.page() as i32)),
			KeyCode::Char('r') => {
				self.refresh();
				self.status = "Refreshed".to_string();
			}
			KeyCode::Char('e') => match self.current.clone() {
				Some(path) => return Control::Edit(path),
				None => self.status = "Select a note to edit".to_string(),
			},
			_ => {}
		}
		Control::Continue
	}

	fn handle_filter_key(&mut self, key: KeyEvent) {
		match key.code {
			KeyCode::Enter => self.filter_input = false,
			KeyCode::Esc => self.clear_filter(),
			KeyCode::Backspace => {
				self.query.pop();
				self.apply_filter();
			}
			KeyCode::Char(c) => {
				self.query.push(c);
				self.apply_filter();
			}
			_ => {}
		}
	}

	fn clear_filter(&mut self) {
		self.filter_input = false;
		self.query.clear();
		self.apply_filter();
	}

	fn move_selection(&mut self, delta: isize) {
		if self.workspace.notes.move_by(delta) {
			self.show_selected();
		}
	}

	fn page(&self) -> u16 {
		if self.preview_height == 0 {
			DEFAULT_PAGE
		} else {
			self.preview_height
		}
	}

	/// Largest offset that still shows a line of the displayed output.
	pub(super) fn max_scroll(&self) -> u16 {
		let lines = match self.scheduler.display() {
			Display::Rendered { output, .. } => output.lines().count(),
			Display::Failed {
				fallback: Some(output),
				..
			} => output.lines().count() + 1,
			_ => 0,
		};
		u16::try_from(lines.saturating_sub(1)).unwrap_or(u16::MAX)
	}

	fn scroll_preview(&mut self, delta: i32) {
		let max = self.max_scroll();
		let next = (i32::from(self.scroll) + delta).clamp(0, i32::from(max));
		self.scroll = u16::try_from(next).unwrap_or(0);
	}
}
