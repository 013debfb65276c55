use std::fmt;

use super::RenderError;

/// Converts raw document text into styled terminal output.
///
/// Implementations are shared between worker threads through the
/// [`RendererPool`](super::RendererPool), so they must be `Send + Sync`.
pub trait Converter: Send + Sync {
	fn convert(&self, source: &str) -> Result<String, RenderError>;
}

/// Builds width-specific [`Converter`] instances for the pool.
pub trait EngineFactory: Send + Sync {
	type Engine: Converter;

	fn build(&self, width: u16) -> Result<Self::Engine, RenderError>;
}

/// Colour scheme handed to the conversion engine.
///
/// The default is a fixed dark palette. None of the styles query the
/// terminal for its background colour, so no escape sequences can leak into
/// the input stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderStyle {
	#[default]
	Dark,
	Light,
	/// Plain text without any escape sequences.
	NoTty,
}

impl RenderStyle {
	/// Environment variable that overrides the configured style.
	pub const ENV_VAR: &'static str = "MARGINALIA_STYLE";

	pub const NAMES: [&'static str; 3] = ["dark", "light", "notty"];

	/// Parse a style name, ignoring case and surrounding whitespace.
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"dark" => Some(Self::Dark),
			"light" => Some(Self::Light),
			"notty" | "plain" => Some(Self::NoTty),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Dark => "dark",
			Self::Light => "light",
			Self::NoTty => "notty",
		}
	}
}

impl fmt::Display for RenderStyle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_accepts_known_names() {
		assert_eq!(RenderStyle::parse(" Dark "), Some(RenderStyle::Dark));
		assert_eq!(RenderStyle::parse("LIGHT"), Some(RenderStyle::Light));
		assert_eq!(RenderStyle::parse("plain"), Some(RenderStyle::NoTty));
		assert_eq!(RenderStyle::parse("auto"), None);
	}

	#[test]
	fn names_round_trip_through_parse() {
		for name in RenderStyle::NAMES {
			let style = RenderStyle::parse(name).unwrap();
			assert_eq!(style.as_str(), name);
		}
	}
}
