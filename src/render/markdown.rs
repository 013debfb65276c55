//! ANSI markdown engine built on `pulldown-cmark`.
//!
//! The engine walks the parser's event stream and writes SGR-styled text,
//! word-wrapped to the width it was constructed for. Styling is applied per
//! word, so a line break never has to carry open escape sequences over.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{Converter, EngineFactory, RenderError, RenderStyle};

const BULLET: &str = "• ";
const QUOTE_BAR: &str = "│ ";
const CODE_INDENT: &str = "  ";

/// Builds [`MarkdownEngine`]s for the renderer pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFactory {
	style: RenderStyle,
}

impl MarkdownFactory {
	pub fn new(style: RenderStyle) -> Self {
		Self { style }
	}
}

impl EngineFactory for MarkdownFactory {
	type Engine = MarkdownEngine;

	fn build(&self, width: u16) -> Result<MarkdownEngine, RenderError> {
		if width == 0 {
			return Err(RenderError::Construct {
				width,
				reason: "width must be positive".into(),
			});
		}
		Ok(MarkdownEngine::new(width, self.style))
	}
}

/// Converts markdown to ANSI-styled text wrapped at a fixed width.
#[derive(Debug, Clone)]
pub struct MarkdownEngine {
	width: u16,
	palette: Palette,
}

impl MarkdownEngine {
	pub fn new(width: u16, style: RenderStyle) -> Self {
		Self {
			width,
			palette: Palette::for_style(style),
		}
	}

	pub fn width(&self) -> u16 {
		self.width
	}
}

impl Converter for MarkdownEngine {
	fn convert(&self, source: &str) -> Result<String, RenderError> {
		let options = Options::ENABLE_TABLES
			| Options::ENABLE_STRIKETHROUGH
			| Options::ENABLE_TASKLISTS
			| Options::ENABLE_FOOTNOTES;
		let mut writer = AnsiWriter::new(&self.palette, usize::from(self.width));
		for event in Parser::new_ext(source, options) {
			writer.event(event);
		}
		Ok(writer.finish())
	}
}

/// SGR parameters for each element. `enabled == false` strips all escapes.
#[derive(Debug, Clone, Copy)]
struct Palette {
	enabled: bool,
	heading: &'static str,
	code: &'static str,
	link: &'static str,
	muted: &'static str,
	marker: &'static str,
}

impl Palette {
	fn for_style(style: RenderStyle) -> Self {
		match style {
			RenderStyle::Dark => Self {
				enabled: true,
				heading: "1;96",
				code: "33",
				link: "4;94",
				muted: "90",
				marker: "96",
			},
			RenderStyle::Light => Self {
				enabled: true,
				heading: "1;34",
				code: "35",
				link: "4;34",
				muted: "2",
				marker: "34",
			},
			RenderStyle::NoTty => Self {
				enabled: false,
				heading: "",
				code: "",
				link: "",
				muted: "",
				marker: "",
			},
		}
	}
}

enum Prefix {
	Quote,
	/// Continuation indent of a list item; the first line shows the marker.
	Item(usize),
}

struct Link {
	target: String,
	text: String,
}

#[derive(Default)]
struct Table {
	rows: Vec<Vec<String>>,
	row: Vec<String>,
	cell: String,
	has_header: bool,
}

struct AnsiWriter<'p> {
	palette: &'p Palette,
	width: usize,
	out: String,
	line: String,
	line_width: usize,
	line_started: bool,
	line_has_text: bool,
	pending_space: bool,
	blank_pending: bool,
	styles: Vec<&'static str>,
	prefixes: Vec<Prefix>,
	marker: Option<String>,
	lists: Vec<Option<u64>>,
	links: Vec<Link>,
	code_block: Option<String>,
	table: Option<Table>,
}

impl<'p> AnsiWriter<'p> {
	fn new(palette: &'p Palette, width: usize) -> Self {
		Self {
			palette,
			width: width.max(1),
			out: String::new(),
			line: String::new(),
			line_width: 0,
			line_started: false,
			line_has_text: false,
			pending_space: false,
			blank_pending: false,
			styles: Vec::new(),
			prefixes: Vec::new(),
			marker: None,
			lists: Vec::new(),
			links: Vec::new(),
			code_block: None,
			table: None,
		}
	}

	fn event(&mut self, event: Event<'_>) {
		match event {
			Event::Start(tag) => self.start(tag),
			Event::End(tag) => self.end(tag),
			Event::Text(text) => self.text(&text),
			Event::Code(code) => self.inline_code(&code),
			Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
			Event::SoftBreak => self.pending_space = true,
			Event::HardBreak => {
				self.ensure_line_started();
				self.break_line();
			}
			Event::Rule => self.rule(),
			Event::TaskListMarker(done) => {
				self.push_word(if done { "[x]" } else { "[ ]" });
				self.pending_space = true;
			}
			Event::FootnoteReference(label) => self.push_literal(&format!("[^{label}]")),
			_ => {}
		}
	}

	fn start(&mut self, tag: Tag<'_>) {
		match tag {
			Tag::Paragraph => self.start_block(),
			Tag::Heading { level, .. } => {
				self.start_block();
				self.styles.push(self.palette.heading);
				self.push_word(&"#".repeat(level as usize));
				self.pending_space = true;
			}
			Tag::BlockQuote(_) => {
				self.start_block();
				self.prefixes.push(Prefix::Quote);
			}
			Tag::CodeBlock(_) => {
				self.start_block();
				self.code_block = Some(String::new());
			}
			Tag::List(start) => {
				if self.lists.is_empty() {
					self.start_block();
				} else {
					self.flush_line();
				}
				self.lists.push(start);
			}
			Tag::Item => {
				self.flush_line();
				if self.blank_pending && !self.out.is_empty() {
					self.blank_line();
				}
				self.blank_pending = false;
				let marker = match self.lists.last_mut() {
					Some(Some(number)) => {
						let marker = format!("{number}. ");
						*number += 1;
						marker
					}
					_ => BULLET.to_string(),
				};
				self.prefixes
					.push(Prefix::Item(UnicodeWidthStr::width(marker.as_str())));
				self.marker = Some(marker);
			}
			Tag::FootnoteDefinition(label) => {
				self.start_block();
				self.push_word(&format!("[^{label}]:"));
				self.pending_space = true;
			}
			Tag::Table(_) => {
				self.start_block();
				self.table = Some(Table::default());
			}
			Tag::TableHead => {
				if let Some(table) = self.table.as_mut() {
					table.has_header = true;
				}
			}
			Tag::Emphasis => self.styles.push("3"),
			Tag::Strong => self.styles.push("1"),
			Tag::Strikethrough => self.styles.push("9"),
			Tag::Link { dest_url, .. } => {
				self.styles.push(self.palette.link);
				self.links.push(Link {
					target: dest_url.to_string(),
					text: String::new(),
				});
			}
			Tag::Image { .. } => self.push_literal("["),
			_ => {}
		}
	}

	fn end(&mut self, tag: TagEnd) {
		match tag {
			TagEnd::Paragraph => self.end_block(),
			TagEnd::Heading(_) => {
				self.styles.pop();
				self.end_block();
			}
			TagEnd::BlockQuote(_) => {
				self.flush_line();
				self.prefixes.pop();
				self.end_block();
			}
			TagEnd::CodeBlock => {
				if let Some(code) = self.code_block.take() {
					self.code_lines(&code);
				}
				self.end_block();
			}
			TagEnd::List(_) => {
				self.lists.pop();
				if self.lists.is_empty() {
					self.end_block();
				} else {
					self.flush_line();
				}
			}
			TagEnd::Item => {
				if self.marker.is_some() {
					self.ensure_line_started();
				}
				self.flush_line();
				self.prefixes.pop();
			}
			TagEnd::FootnoteDefinition => self.end_block(),
			TagEnd::Table => {
				if let Some(table) = self.table.take() {
					self.table_lines(table);
				}
				self.end_block();
			}
			TagEnd::TableHead | TagEnd::TableRow => {
				if let Some(table) = self.table.as_mut() {
					let row = std::mem::take(&mut table.row);
					table.rows.push(row);
				}
			}
			TagEnd::TableCell => {
				if let Some(table) = self.table.as_mut() {
					let cell = std::mem::take(&mut table.cell);
					table.row.push(cell.trim().to_string());
				}
			}
			TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
				self.styles.pop();
			}
			TagEnd::Link => {
				self.styles.pop();
				if let Some(link) = self.links.pop()
					&& !link.target.is_empty()
					&& link.text.trim() != link.target
				{
					let suffix = format!("({})", link.target);
					if let Some(table) = self.table.as_mut() {
						table.cell.push(' ');
						table.cell.push_str(&suffix);
					} else {
						self.pending_space = true;
						self.styles.push(self.palette.muted);
						self.push_word(&suffix);
						self.styles.pop();
					}
				}
			}
			TagEnd::Image => self.push_literal("]"),
			_ => {}
		}
	}

	fn text(&mut self, text: &str) {
		if let Some(code) = self.code_block.as_mut() {
			code.push_str(text);
			return;
		}
		if let Some(link) = self.links.last_mut() {
			link.text.push_str(text);
		}
		if let Some(table) = self.table.as_mut() {
			table.cell.push_str(text);
			return;
		}
		self.push_text(text);
	}

	/// Markup emitted verbatim, into the current table cell when inside one.
	fn push_literal(&mut self, literal: &str) {
		match self.table.as_mut() {
			Some(table) => table.cell.push_str(literal),
			None => self.push_word(literal),
		}
	}

	fn inline_code(&mut self, code: &str) {
		if let Some(table) = self.table.as_mut() {
			table.cell.push_str(code);
			return;
		}
		self.styles.push(self.palette.code);
		self.push_text(code);
		self.styles.pop();
	}

	fn rule(&mut self) {
		self.start_block();
		self.ensure_line_started();
		let remaining = self.width.saturating_sub(self.line_width).max(3);
		let muted = [self.palette.muted];
		write_span(&mut self.line, self.palette, &muted, &"─".repeat(remaining));
		self.break_line();
		self.end_block();
	}

	fn code_lines(&mut self, code: &str) {
		let style = [self.palette.code];
		for line in code.trim_end_matches('\n').lines() {
			self.ensure_line_started();
			self.line.push_str(CODE_INDENT);
			write_span(&mut self.line, self.palette, &style, &line.replace('\t', "    "));
			self.break_line();
		}
	}

	fn table_lines(&mut self, table: Table) {
		let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
		let mut widths = vec![0usize; columns];
		for row in &table.rows {
			for (index, cell) in row.iter().enumerate() {
				widths[index] = widths[index].max(UnicodeWidthStr::width(cell.as_str()));
			}
		}

		let bold = ["1"];
		for (row_index, row) in table.rows.iter().enumerate() {
			self.ensure_line_started();
			for (index, width) in widths.iter().enumerate() {
				if index > 0 {
					self.line.push_str(" │ ");
				}
				let cell = row.get(index).map(String::as_str).unwrap_or("");
				let padding = width.saturating_sub(UnicodeWidthStr::width(cell));
				let padded = format!("{cell}{}", " ".repeat(padding));
				if table.has_header && row_index == 0 {
					write_span(&mut self.line, self.palette, &bold, &padded);
				} else {
					self.line.push_str(&padded);
				}
			}
			self.trim_line_end();
			self.break_line();

			if table.has_header && row_index == 0 {
				self.ensure_line_started();
				let separator: Vec<String> = widths.iter().map(|width| "─".repeat(*width)).collect();
				let muted = [self.palette.muted];
				write_span(&mut self.line, self.palette, &muted, &separator.join("─┼─"));
				self.break_line();
			}
		}
	}

	fn push_text(&mut self, text: &str) {
		let mut word_start = None;
		for (index, ch) in text.char_indices() {
			if ch.is_whitespace() {
				if let Some(start) = word_start.take() {
					self.push_word(&text[start..index]);
				}
				self.pending_space = true;
			} else if word_start.is_none() {
				word_start = Some(index);
			}
		}
		if let Some(start) = word_start {
			self.push_word(&text[start..]);
		}
	}

	fn push_word(&mut self, word: &str) {
		let width = UnicodeWidthStr::width(word);
		let space = usize::from(self.pending_space && self.line_has_text);
		self.pending_space = false;

		if self.line_has_text && self.line_width + space + width > self.width {
			self.break_line();
		} else if space == 1 {
			self.line.push(' ');
			self.line_width += 1;
		}
		self.ensure_line_started();

		if self.line_width + width > self.width {
			self.push_long_word(word);
			return;
		}
		write_span(&mut self.line, self.palette, &self.styles, word);
		self.line_width += width;
		self.line_has_text = true;
	}

	/// Hard-wrap a word that does not fit on an empty line.
	fn push_long_word(&mut self, word: &str) {
		let mut chunk = String::new();
		let mut chunk_width = 0;
		for ch in word.chars() {
			let ch_width = ch.width().unwrap_or(0);
			let fits = self.line_width + chunk_width + ch_width <= self.width;
			if !fits && (!chunk.is_empty() || self.line_has_text) {
				if !chunk.is_empty() {
					write_span(&mut self.line, self.palette, &self.styles, &chunk);
					self.line_has_text = true;
				}
				chunk.clear();
				chunk_width = 0;
				self.break_line();
				self.ensure_line_started();
			}
			chunk.push(ch);
			chunk_width += ch_width;
		}
		if !chunk.is_empty() {
			write_span(&mut self.line, self.palette, &self.styles, &chunk);
			self.line_width += chunk_width;
			self.line_has_text = true;
		}
	}

	fn ensure_line_started(&mut self) {
		if self.line_started {
			return;
		}
		self.line_started = true;

		let last_item = self
			.prefixes
			.iter()
			.rposition(|prefix| matches!(prefix, Prefix::Item(_)));
		for (index, prefix) in self.prefixes.iter().enumerate() {
			match prefix {
				Prefix::Quote => {
					let muted = [self.palette.muted];
					write_span(&mut self.line, self.palette, &muted, QUOTE_BAR);
					self.line_width += UnicodeWidthStr::width(QUOTE_BAR);
				}
				Prefix::Item(indent) => {
					let marker = if Some(index) == last_item {
						self.marker.take()
					} else {
						None
					};
					match marker {
						Some(marker) => {
							let style = [self.palette.marker];
							write_span(&mut self.line, self.palette, &style, &marker);
						}
						None => self.line.push_str(&" ".repeat(*indent)),
					}
					self.line_width += indent;
				}
			}
		}
	}

	fn break_line(&mut self) {
		self.trim_line_end();
		self.out.push_str(&self.line);
		self.out.push('\n');
		self.line.clear();
		self.line_width = 0;
		self.line_started = false;
		self.line_has_text = false;
		self.pending_space = false;
	}

	fn flush_line(&mut self) {
		if self.line_started {
			self.break_line();
		}
	}

	fn blank_line(&mut self) {
		let marker = self.marker.take();
		self.ensure_line_started();
		self.break_line();
		self.marker = marker;
	}

	fn start_block(&mut self) {
		self.flush_line();
		if self.blank_pending && !self.out.is_empty() && self.marker.is_none() {
			self.blank_line();
		}
		self.blank_pending = false;
		self.pending_space = false;
	}

	fn end_block(&mut self) {
		self.flush_line();
		self.blank_pending = true;
	}

	fn trim_line_end(&mut self) {
		let trimmed = self.line.trim_end_matches(' ').len();
		self.line.truncate(trimmed);
	}

	fn finish(mut self) -> String {
		self.flush_line();
		while self.out.ends_with("\n\n") {
			self.out.pop();
		}
		self.out
	}
}

fn write_span(line: &mut String, palette: &Palette, styles: &[&str], text: &str) {
	if text.is_empty() {
		return;
	}
	if !palette.enabled || styles.is_empty() {
		line.push_str(text);
		return;
	}
	line.push_str("\u{1b}[");
	line.push_str(&styles.join(";"));
	line.push('m');
	line.push_str(text);
	line.push_str("\u{1b}[0m");
}

#[cfg(test)]
mod tests {
	use super::*;

	fn plain(source: &str, width: u16) -> String {
		MarkdownEngine::new(width, RenderStyle::NoTty)
			.convert(source)
			.unwrap()
	}

	#[test]
	fn factory_rejects_zero_width() {
		let factory = MarkdownFactory::new(RenderStyle::Dark);
		assert!(factory.build(0).is_err());
		assert_eq!(factory.build(40).unwrap().width(), 40);
	}

	#[test]
	fn headings_keep_their_markers() {
		let output = plain("# Title\n\n## Section\n", 40);
		assert_eq!(output, "# Title\n\n## Section\n");
	}

	#[test]
	fn dark_style_emits_escape_sequences() {
		let output = MarkdownEngine::new(40, RenderStyle::Dark)
			.convert("# Title\n\nsome **bold** text")
			.unwrap();
		assert!(output.contains("\u{1b}[1;96m#\u{1b}[0m"));
		assert!(output.contains("\u{1b}[1mbold\u{1b}[0m"));
	}

	#[test]
	fn notty_style_is_plain() {
		let output = plain("# Title\n\n*em* `code` [link](https://example.com)", 60);
		assert!(!output.contains('\u{1b}'));
		assert!(output.contains("em code link (https://example.com)"));
	}

	#[test]
	fn paragraphs_wrap_at_engine_width() {
		let source = "The quick brown fox jumps over the lazy dog and keeps running far away.";
		let output = plain(source, 20);
		assert!(output.lines().count() > 1);
		for line in output.lines() {
			assert!(UnicodeWidthStr::width(line) <= 20, "line too wide: {line:?}");
		}
		let rejoined: Vec<&str> = output.split_whitespace().collect();
		assert_eq!(rejoined.join(" "), source);
	}

	#[test]
	fn long_words_are_split() {
		let output = plain("abcdefghijklmnopqrstuvwxyz", 10);
		assert_eq!(output, "abcdefghij\nklmnopqrst\nuvwxyz\n");
	}

	#[test]
	fn lists_use_markers_and_indent_continuations() {
		let output = plain("- first\n- second item that wraps\n\n1. one\n2. two\n", 16);
		let lines: Vec<&str> = output.lines().collect();
		assert_eq!(lines[0], "• first");
		assert_eq!(lines[1], "• second item");
		assert_eq!(lines[2], "  that wraps");
		assert!(lines.contains(&"1. one"));
		assert!(lines.contains(&"2. two"));
	}

	#[test]
	fn nested_lists_indent() {
		let output = plain("- outer\n  - inner\n", 40);
		assert_eq!(output, "• outer\n  • inner\n");
	}

	#[test]
	fn task_markers_render_as_checkboxes() {
		let output = plain("- [x] done\n- [ ] todo\n", 40);
		assert_eq!(output, "• [x] done\n• [ ] todo\n");
	}

	#[test]
	fn block_quotes_are_prefixed() {
		let output = plain("> quoted words here", 12);
		for line in output.lines() {
			assert!(line.starts_with(QUOTE_BAR), "missing bar: {line:?}");
		}
	}

	#[test]
	fn code_blocks_are_indented_and_not_wrapped() {
		let output = plain("```\nlet value = compute_something_long();\n```\n", 10);
		assert_eq!(output, "  let value = compute_something_long();\n");
	}

	#[test]
	fn tables_are_column_aligned() {
		let output = plain("| a | bb |\n|---|---|\n| ccc | d |\n", 40);
		let lines: Vec<&str> = output.lines().collect();
		assert_eq!(lines[0], "a   │ bb");
		assert_eq!(lines[1], "────┼───");
		assert_eq!(lines[2], "ccc │ d");
	}

	#[test]
	fn table_cells_keep_link_targets_and_image_alt_text() {
		let output = plain(
			"| a | b |\n|---|---|\n| [x](https://e.com) | ![alt](i.png) |\n",
			60,
		);
		let lines: Vec<&str> = output.lines().collect();
		assert_eq!(lines[0], format!("a{} │ b", " ".repeat(16)));
		assert_eq!(lines[2], "x (https://e.com) │ [alt]");
		assert_eq!(lines.len(), 3);
	}

	#[test]
	fn images_show_alt_text_in_brackets() {
		assert_eq!(plain("![a diagram](d.png)", 40), "[a diagram]\n");
	}

	#[test]
	fn rules_fill_the_width() {
		let output = plain("above\n\n---\n\nbelow", 8);
		assert!(output.contains(&"─".repeat(8)));
	}
}
