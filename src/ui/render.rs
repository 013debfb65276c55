use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use throbber_widgets_tui::Throbber;

use super::App;
use super::ansi::ansi_to_text;
use crate::render::Display;

const MIN_LIST_WIDTH: u16 = 40;
const MIN_PREVIEW_WIDTH: u16 = 20;
const KEY_HINTS: &str = "j/k move  PgUp/PgDn scroll  / filter  e edit  r refresh  q quit";

/// Width of the note list and the preview pane for a terminal `width`.
pub(crate) fn split_columns(width: u16) -> (u16, u16) {
	let list = (width / 3)
		.max(MIN_LIST_WIDTH)
		.min(width.saturating_sub(MIN_PREVIEW_WIDTH));
	(list, width - list)
}

/// Columns available to rendered text inside the bordered preview.
pub(crate) fn preview_columns(width: u16) -> u16 {
	split_columns(width).1.saturating_sub(2)
}

impl App {
	pub fn draw(&mut self, frame: &mut Frame) {
		let [body, footer] =
			Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());
		let (list_width, _) = split_columns(body.width);
		let [list_area, preview_area] =
			Layout::horizontal([Constraint::Length(list_width), Constraint::Min(1)]).areas(body);

		self.draw_list(frame, list_area);
		self.draw_preview(frame, preview_area);
		self.draw_status(frame, footer);
	}

	fn draw_list(&mut self, frame: &mut Frame, area: Rect) {
		let notes = &self.workspace.notes;
		let items: Vec<ListItem> = notes
			.notes()
			.iter()
			.map(|note| ListItem::new(notes.label(note)))
			.collect();
		let title = if notes.is_filtered() {
			format!(" Notes ({}/{}) ", notes.len(), notes.total())
		} else {
			format!(" Notes ({}) ", notes.len())
		};
		let list = List::new(items)
			.block(Block::default().borders(Borders::ALL).title(title))
			.highlight_style(Style::default().add_modifier(Modifier::REVERSED));

		self.list_state.select(notes.selected_index());
		frame.render_stateful_widget(list, area, &mut self.list_state);
	}

	fn draw_preview(&mut self, frame: &mut Frame, area: Rect) {
		let title = self
			.current
			.as_deref()
			.map(|path| format!(" {} ", self.workspace.notes.label(path)))
			.unwrap_or_else(|| " Preview ".to_string());
		let block = Block::default().borders(Borders::ALL).title(title);
		self.preview_height = block.inner(area).height;

		let muted = Style::default().fg(Color::DarkGray);
		let content = match self.scheduler.display() {
			Display::Empty => Text::from(Span::styled("Select a note to view", muted)),
			Display::Placeholder { .. } => {
				let spinner = Throbber::default()
					.style(muted)
					.throbber_style(muted)
					.to_symbol_span(&self.throbber_state);
				Text::from(Line::from(vec![spinner, Span::styled("Rendering...", muted)]))
			}
			Display::Rendered { output, .. } => ansi_to_text(output),
			Display::Failed {
				message, fallback, ..
			} => {
				let mut text = Text::from(Span::styled(
					format!("Could not render: {message}"),
					Style::default().fg(Color::Red),
				));
				if let Some(output) = fallback {
					text.lines.extend(ansi_to_text(output).lines);
				}
				text
			}
		};

		let preview = Paragraph::new(content)
			.block(block)
			.scroll((self.scroll, 0));
		frame.render_widget(preview, area);
	}

	fn draw_status(&self, frame: &mut Frame, area: Rect) {
		let line = if self.filter_input {
			Line::from(format!("/{}", self.query))
		} else if self.status.is_empty() {
			Line::from(Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray)))
		} else {
			Line::from(self.status.as_str())
		};
		frame.render_widget(Paragraph::new(line), area);
	}
}
