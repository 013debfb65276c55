//! Markdown preview rendering for the note pane.
//!
//! The module is split into small pieces so the data flow stays easy to
//! follow:
//! - `scheduler` decides whether a request is served from the cache or
//!   debounced into a background render, and filters stale results.
//! - `cache` stores finished renders keyed by path, modification time and
//!   width bucket.
//! - `pool` keeps a bounded set of width-specific engines alive between
//!   renders.
//! - `task` performs the file I/O and conversion off the interactive loop.
//! - `engine` and `markdown` define the conversion seam and the bundled
//!   markdown engine.

mod cache;
mod engine;
mod error;
mod markdown;
mod messages;
mod pool;
mod scheduler;
mod task;

use std::time::Duration;

pub use cache::{RenderCache, RenderCacheEntry};
pub use engine::{Converter, EngineFactory, RenderStyle};
pub use error::RenderError;
pub use markdown::{MarkdownEngine, MarkdownFactory};
pub use messages::{RenderRequest, RenderResult};
pub use pool::RendererPool;
pub use scheduler::{Display, PendingRender, RenderScheduler, ResultDisposition};
pub use task::{render_document, spawn_render};

/// Delay between the last render request and the background render.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
/// Granularity of the width buckets used as cache keys.
pub const DEFAULT_WIDTH_BUCKET: u16 = 20;
/// Number of width-specific engines retained by the [`RendererPool`].
pub const DEFAULT_POOL_CAPACITY: usize = 8;
/// Width used when the viewport reports zero columns.
pub const FALLBACK_WIDTH: u16 = 80;

/// Tunables consumed by the render scheduler and the renderer pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
	/// Debounce delay applied to cache misses.
	pub debounce: Duration,
	/// Column granularity for width quantization.
	pub width_bucket: u16,
	/// Maximum number of pooled engines.
	pub pool_capacity: usize,
	/// Style handed to the conversion engine.
	pub style: RenderStyle,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			debounce: DEFAULT_DEBOUNCE,
			width_bucket: DEFAULT_WIDTH_BUCKET,
			pool_capacity: DEFAULT_POOL_CAPACITY,
			style: RenderStyle::default(),
		}
	}
}

/// Quantize a viewport width to its render bucket.
///
/// Widths narrower than a single bucket are kept as-is so very narrow panes
/// are never rounded down to zero.
pub fn quantize_width(width: u16, bucket: u16) -> u16 {
	if width == 0 {
		return FALLBACK_WIDTH;
	}
	if bucket <= 1 || width < bucket {
		return width;
	}
	(width / bucket) * bucket
}
