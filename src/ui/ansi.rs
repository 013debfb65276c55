//! Translate SGR-styled engine output into `ratatui` text.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

/// Convert ANSI-styled output into owned [`Text`].
///
/// Only SGR (`ESC [ ... m`) sequences affect styling. Other CSI sequences are
/// dropped along with stray control characters.
pub(crate) fn ansi_to_text(input: &str) -> Text<'static> {
	let lines: Vec<Line<'static>> = input
		.trim_end_matches('\n')
		.split('\n')
		.map(|line| parse_line(line.trim_end_matches('\r')))
		.collect();
	Text::from(lines)
}

fn parse_line(line: &str) -> Line<'static> {
	let mut spans = Vec::new();
	let mut style = Style::default();
	let mut text = String::new();
	let mut rest = line;

	while let Some(index) = rest.find('\u{1b}') {
		push_plain(&mut text, &rest[..index]);
		let sequence = &rest[index + 1..];
		let Some(body) = sequence.strip_prefix('[') else {
			rest = skip_char(sequence);
			continue;
		};
		let Some(end) = body.find(|ch: char| ('@'..='~').contains(&ch)) else {
			rest = "";
			break;
		};
		if body[end..].starts_with('m') {
			if !text.is_empty() {
				spans.push(Span::styled(std::mem::take(&mut text), style));
			}
			style = apply_sgr(style, &body[..end]);
		}
		rest = &body[end + 1..];
	}
	push_plain(&mut text, rest);

	if !text.is_empty() {
		spans.push(Span::styled(text, style));
	}
	Line::from(spans)
}

fn push_plain(buffer: &mut String, chunk: &str) {
	buffer.extend(chunk.chars().filter(|ch| !ch.is_control() || *ch == '\t'));
}

fn skip_char(input: &str) -> &str {
	let mut chars = input.chars();
	chars.next();
	chars.as_str()
}

fn apply_sgr(mut style: Style, params: &str) -> Style {
	let codes: Vec<u16> = if params.is_empty() {
		vec![0]
	} else {
		params
			.split(';')
			.map(|code| code.parse().unwrap_or(0))
			.collect()
	};

	let mut codes = codes.into_iter();
	while let Some(code) = codes.next() {
		style = match code {
			0 => Style::default(),
			1 => style.add_modifier(Modifier::BOLD),
			2 => style.add_modifier(Modifier::DIM),
			3 => style.add_modifier(Modifier::ITALIC),
			4 => style.add_modifier(Modifier::UNDERLINED),
			7 => style.add_modifier(Modifier::REVERSED),
			9 => style.add_modifier(Modifier::CROSSED_OUT),
			22 => style.remove_modifier(Modifier::BOLD | Modifier::DIM),
			23 => style.remove_modifier(Modifier::ITALIC),
			24 => style.remove_modifier(Modifier::UNDERLINED),
			29 => style.remove_modifier(Modifier::CROSSED_OUT),
			30..=37 => style.fg(basic_color(code - 30)),
			90..=97 => style.fg(bright_color(code - 90)),
			40..=47 => style.bg(basic_color(code - 40)),
			100..=107 => style.bg(bright_color(code - 100)),
			39 => style.fg(Color::Reset),
			49 => style.bg(Color::Reset),
			38 | 48 => match extended_color(&mut codes) {
				Some(color) if code == 38 => style.fg(color),
				Some(color) => style.bg(color),
				None => style,
			},
			_ => style,
		};
	}
	style
}

fn extended_color(codes: &mut impl Iterator<Item = u16>) -> Option<Color> {
	let channel = |value: Option<u16>| value.map(|value| value.min(255) as u8);
	match codes.next()? {
		5 => channel(codes.next()).map(Color::Indexed),
		2 => {
			let red = channel(codes.next())?;
			let green = channel(codes.next())?;
			let blue = channel(codes.next())?;
			Some(Color::Rgb(red, green, blue))
		}
		_ => None,
	}
}

fn basic_color(index: u16) -> Color {
	match index {
		0 => Color::Black,
		1 => Color::Red,
		2 => Color::Green,
		3 => Color::Yellow,
		4 => Color::Blue,
		5 => Color::Magenta,
		6 => Color::Cyan,
		_ => Color::Gray,
	}
}

fn bright_color(index: u16) -> Color {
	match index {
		0 => Color::DarkGray,
		1 => Color::LightRed,
		2 => Color::LightGreen,
		3 => Color::LightYellow,
		4 => Color::LightBlue,
		5 => Color::LightMagenta,
		6 => Color::LightCyan,
		_ => Color::White,
	}
}
