//! Cache lookup, debouncing and stale-result filtering for preview renders.
//!
//! Every cache miss bumps a generation counter and yields a [`PendingRender`]
//! that the interactive loop arms as a single-shot timer. Superseded timers
//! and renders are never cancelled: results are simply compared against the
//! active generation when they arrive, and anything older is dropped.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::{
	RenderCache, RenderCacheEntry, RenderOptions, RenderRequest, RenderResult, quantize_width,
};

/// Content currently shown in the preview pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
	/// Nothing selected.
	Empty,
	/// A render for `path` is outstanding.
	Placeholder { path: PathBuf },
	Rendered { path: PathBuf, output: String },
	/// The source could not be read. `fallback` holds the last output cached
	/// for the path, if there was one.
	Failed {
		path: PathBuf,
		message: String,
		fallback: Option<String>,
	},
}

/// Work handed back to the caller on a cache miss.
///
/// The caller must deliver `request` back to
/// [`RenderScheduler::is_current`] once `delay` has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRender {
	pub request: RenderRequest,
	pub delay: Duration,
}

/// What happened to a result passed to [`RenderScheduler::accept_result`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDisposition {
	Applied,
	Failed,
	/// Superseded by a newer request; nothing was touched.
	Stale,
}

pub struct RenderScheduler {
	cache: RenderCache,
	bucket: u16,
	debounce: Duration,
	width: u16,
	generation: u64,
	active: Option<u64>,
	rendering: bool,
	display: Display,
	raw: Option<String>,
}

impl RenderScheduler {
	pub fn new(options: &RenderOptions) -> Self {
		Self {
			cache: RenderCache::new(),
			bucket: options.width_bucket,
			debounce: options.debounce,
			width: quantize_width(0, options.width_bucket),
			generation: 0,
			active: None,
			rendering: false,
			display: Display::Empty,
			raw: None,
		}
	}

	/// Update the viewport width. Returns `true` when the width bucket
	/// changed, meaning the displayed document should be refreshed.
	pub fn set_viewport_width(&mut self, columns: u16) -> bool {
		let width = quantize_width(columns, self.bucket);
		let changed = width != self.width;
		self.width = width;
		changed
	}

	/// Serve `path` from the cache or schedule a debounced render for it.
	///
	/// Returns `None` on a cache hit (the cached output is displayed right
	/// away) and for an empty path.
	pub fn request_render(&mut self, path: &Path) -> Option<PendingRender> {
		if path.as_os_str().is_empty() {
			return None;
		}

		let width = self.width;
		if let Ok(modified) = fs::metadata(path).and_then(|metadata| metadata.modified())
			&& let Some(entry) = self.cache.lookup(path, modified, width)
		{
			trace!(path = %path.display(), width, "render cache hit");
			self.display = Display::Rendered {
				path: path.to_path_buf(),
				output: entry.output.clone(),
			};
			self.raw = Some(entry.raw.clone());
			self.rendering = false;
			self.active = None;
			return None;
		}

		self.rendering = true;
		self.display = Display::Placeholder {
			path: path.to_path_buf(),
		};
		self.generation += 1;
		let generation = self.generation;
		self.active = Some(generation);
		debug!(path = %path.display(), width, generation, "scheduled debounced render");

		Some(PendingRender {
			request: RenderRequest {
				path: path.to_path_buf(),
				width,
				generation,
			},
			delay: self.debounce,
		})
	}

	/// Re-request the active document, if any.
	pub fn refresh(&mut self, current: Option<&Path>) -> Option<PendingRender> {
		current.and_then(|path| self.request_render(path))
	}

	/// Whether a fired debounce trigger still belongs to the newest request.
	pub fn is_current(&self, request: &RenderRequest) -> bool {
		self.active == Some(request.generation)
	}

	/// Apply a finished render if its generation is still active.
	pub fn accept_result(&mut self, result: RenderResult) -> ResultDisposition {
		if self.active != Some(result.generation) {
			trace!(
				path = %result.path.display(),
				generation = result.generation,
				active = ?self.active,
				"discarding stale render"
			);
			return ResultDisposition::Stale;
		}

		self.rendering = false;

		if let Some(error) = result.failure {
			warn!(
				path = %result.path.display(),
				generation = result.generation,
				error = %error,
				"render failed"
			);
			let fallback = self
				.cache
				.get(&result.path)
				.map(|entry| entry.output.clone());
			self.display = Display::Failed {
				path: result.path,
				message: error.to_string(),
				fallback,
			};
			return ResultDisposition::Failed;
		}

		if let Some(modified) = result.modified {
			self.cache.insert(
				result.path.clone(),
				RenderCacheEntry {
					modified,
					width: result.width,
					output: result.output.clone(),
					raw: result.raw.clone(),
				},
			);
		}
		self.display = Display::Rendered {
			path: result.path,
			output: result.output,
		};
		self.raw = Some(result.raw);
		ResultDisposition::Applied
	}

	/// Drop every cached render.
	pub fn clear_cache(&mut self) {
		self.cache.clear();
	}

	/// Reset the pane to the empty state and retire any outstanding render.
	pub fn clear_display(&mut self) {
		self.active = None;
		self.rendering = false;
		self.display = Display::Empty;
		self.raw = None;
	}

	pub fn display(&self) -> &Display {
		&self.display
	}

	/// Raw source of the displayed document.
	pub fn raw_source(&self) -> Option<&str> {
		self.raw.as_deref()
	}

	pub fn is_rendering(&self) -> bool {
		self.rendering
	}

	/// Last generation handed out.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn active_generation(&self) -> Option<u64> {
		self.active
	}

	/// Current quantized width.
	pub fn width(&self) -> u16 {
		self.width
	}

	pub fn debounce(&self) -> Duration {
		self.debounce
	}

	pub fn cache(&self) -> &RenderCache {
		&self.cache
	}

	pub fn cache_mut(&mut self) -> &mut RenderCache {
		&mut self.cache
	}
}

#[cfg(test)]
mod tests {
	use std::io;
	use std::time::SystemTime;

	use tempfile::{TempDir, tempdir};

	use super::*;
	use crate::render::RenderError;

	fn note(contents: &str) -> (TempDir, PathBuf) {
		let dir = tempdir().unwrap();
		let path = dir.path().join("note.md");
		fs::write(&path, contents).unwrap();
		(dir, path)
	}

	fn scheduler(columns: u16) -> RenderScheduler {
		let mut scheduler = RenderScheduler::new(&RenderOptions::default());
		scheduler.set_viewport_width(columns);
		scheduler
	}

	fn modified(path: &Path) -> SystemTime {
		fs::metadata(path).unwrap().modified().unwrap()
	}

	fn finished(request: &RenderRequest, output: &str) -> RenderResult {
		RenderResult {
			path: request.path.clone(),
			width: request.width,
			generation: request.generation,
			output: output.into(),
			raw: "# raw".into(),
			modified: modified(&request.path).into(),
			failure: None,
		}
	}

	#[test]
	fn cache_hit_displays_entry_without_scheduling() {
		let (_dir, path) = note("# cached\n");
		let mut scheduler = scheduler(81);
		scheduler.cache_mut().insert(
			path.clone(),
			RenderCacheEntry {
				modified: modified(&path),
				width: 80,
				output: "cached-render-output".into(),
				raw: "# cached\n".into(),
			},
		);
		let before = scheduler.generation();

		let pending = scheduler.request_render(&path);

		assert!(pending.is_none());
		assert_eq!(scheduler.generation(), before);
		assert!(!scheduler.is_rendering());
		assert_eq!(
			scheduler.display(),
			&Display::Rendered {
				path: path.clone(),
				output: "cached-render-output".into(),
			}
		);
		assert_eq!(scheduler.raw_source(), Some("# cached\n"));
	}

	#[test]
	fn cache_miss_schedules_debounced_render() {
		let (_dir, path) = note("# miss\n");
		let mut scheduler = scheduler(81);
		let before = scheduler.generation();

		let pending = scheduler.request_render(&path).expect("render scheduled");

		assert_eq!(scheduler.generation(), before + 1);
		assert_eq!(pending.request.generation, before + 1);
		assert_eq!(pending.request.width, 80);
		assert_eq!(pending.delay, Duration::from_millis(500));
		assert!(scheduler.is_rendering());
		assert_eq!(
			scheduler.display(),
			&Display::Placeholder { path: path.clone() }
		);
	}

	#[test]
	fn width_mismatch_is_a_miss() {
		let (_dir, path) = note("# wide\n");
		let mut scheduler = scheduler(100);
		scheduler.cache_mut().insert(
			path.clone(),
			RenderCacheEntry {
				modified: modified(&path),
				width: 80,
				output: "narrow".into(),
				raw: String::new(),
			},
		);

		assert!(scheduler.request_render(&path).is_some());
	}

	#[test]
	fn generations_strictly_increase() {
		let (_dir, path) = note("text");
		let mut scheduler = scheduler(80);

		let generations: Vec<u64> = (0..5)
			.map(|_| scheduler.request_render(&path).unwrap().request.generation)
			.collect();

		assert!(generations.windows(2).all(|pair| pair[0] < pair[1]));
	}

	#[test]
	fn only_latest_trigger_is_current() {
		let (_dir, path) = note("text");
		let mut scheduler = scheduler(80);
		let first = scheduler.request_render(&path).unwrap();
		let second = scheduler.request_render(&path).unwrap();

		assert!(!scheduler.is_current(&first.request));
		assert!(scheduler.is_current(&second.request));
	}

	#[test]
	fn matching_result_is_cached_and_displayed() {
		let (_dir, path) = note("# fresh\n");
		let mut scheduler = scheduler(80);
		let pending = scheduler.request_render(&path).unwrap();

		let disposition = scheduler.accept_result(finished(&pending.request, "rendered"));

		assert_eq!(disposition, ResultDisposition::Applied);
		assert!(!scheduler.is_rendering());
		assert_eq!(
			scheduler.display(),
			&Display::Rendered {
				path: path.clone(),
				output: "rendered".into(),
			}
		);
		assert!(scheduler.request_render(&path).is_none());
	}

	#[test]
	fn stale_results_are_ignored_in_any_order() {
		let (_dir, path) = note("# body\n");
		let mut scheduler = scheduler(80);
		let older = scheduler.request_render(&path).unwrap();
		let newer = scheduler.request_render(&path).unwrap();

		assert_eq!(
			scheduler.accept_result(finished(&newer.request, "new")),
			ResultDisposition::Applied
		);
		assert_eq!(
			scheduler.accept_result(finished(&older.request, "old")),
			ResultDisposition::Stale
		);

		assert_eq!(
			scheduler.display(),
			&Display::Rendered {
				path: path.clone(),
				output: "new".into(),
			}
		);
		assert_eq!(
			scheduler.cache().get(&path).map(|entry| entry.output.as_str()),
			Some("new")
		);
	}

	#[test]
	fn stale_result_before_fresh_one_touches_nothing() {
		let (_dir, path) = note("# body\n");
		let mut scheduler = scheduler(80);
		let older = scheduler.request_render(&path).unwrap();
		let _newer = scheduler.request_render(&path).unwrap();

		let disposition = scheduler.accept_result(finished(&older.request, "old"));

		assert_eq!(disposition, ResultDisposition::Stale);
		assert!(scheduler.cache().is_empty());
		assert!(scheduler.is_rendering());
		assert_eq!(scheduler.display(), &Display::Placeholder { path });
	}

	#[test]
	fn cache_hit_retires_in_flight_render() {
		let (dir, cached) = note("# cached\n");
		let other = dir.path().join("other.md");
		fs::write(&other, "# other\n").unwrap();
		let mut scheduler = scheduler(80);
		scheduler.cache_mut().insert(
			cached.clone(),
			RenderCacheEntry {
				modified: modified(&cached),
				width: 80,
				output: "cached".into(),
				raw: String::new(),
			},
		);

		let pending = scheduler.request_render(&other).unwrap();
		assert!(scheduler.request_render(&cached).is_none());

		assert_eq!(
			scheduler.accept_result(finished(&pending.request, "other")),
			ResultDisposition::Stale
		);
		assert_eq!(
			scheduler.display(),
			&Display::Rendered {
				path: cached,
				output: "cached".into(),
			}
		);
	}

	#[test]
	fn failure_leaves_cache_untouched_and_shows_fallback() {
		let (_dir, path) = note("# body\n");
		let mut scheduler = scheduler(80);
		scheduler.cache_mut().insert(
			path.clone(),
			RenderCacheEntry {
				modified: SystemTime::UNIX_EPOCH,
				width: 80,
				output: "previous".into(),
				raw: String::new(),
			},
		);
		let pending = scheduler.request_render(&path).unwrap();
		let failure = RenderResult {
			path: path.clone(),
			width: 80,
			generation: pending.request.generation,
			output: String::new(),
			raw: String::new(),
			modified: None,
			failure: Some(RenderError::Read {
				path: path.clone(),
				source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
			}),
		};

		let disposition = scheduler.accept_result(failure);

		assert_eq!(disposition, ResultDisposition::Failed);
		assert!(!scheduler.is_rendering());
		assert_eq!(
			scheduler.cache().get(&path).map(|entry| entry.modified),
			Some(SystemTime::UNIX_EPOCH)
		);
		match scheduler.display() {
			Display::Failed { fallback, .. } => assert_eq!(fallback.as_deref(), Some("previous")),
			other => panic!("expected failure display, got {other:?}"),
		}
	}

	#[test]
	fn resize_within_bucket_is_not_a_change() {
		let mut scheduler = scheduler(81);
		assert!(!scheduler.set_viewport_width(95));
		assert!(scheduler.set_viewport_width(101));
		assert_eq!(scheduler.width(), 100);
	}

	#[test]
	fn clear_display_retires_active_generation() {
		let (_dir, path) = note("text");
		let mut scheduler = scheduler(80);
		let pending = scheduler.request_render(&path).unwrap();

		scheduler.clear_display();

		assert!(!scheduler.is_current(&pending.request));
		assert_eq!(scheduler.display(), &Display::Empty);
		assert_eq!(
			scheduler.accept_result(finished(&pending.request, "late")),
			ResultDisposition::Stale
		);
	}
}
