use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A finished render together with the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCacheEntry {
	/// Modification time of the source when it was rendered.
	pub modified: SystemTime,
	/// Width bucket used for wrapping.
	pub width: u16,
	/// Styled output ready for the preview pane.
	pub output: String,
	/// Raw markdown source.
	pub raw: String,
}

impl RenderCacheEntry {
	/// An entry is only valid when both the timestamp and the width match
	/// exactly.
	pub fn matches(&self, modified: SystemTime, width: u16) -> bool {
		self.width == width && self.modified == modified
	}
}

/// Per-path cache of finished renders.
#[derive(Debug, Default)]
pub struct RenderCache {
	entries: HashMap<PathBuf, RenderCacheEntry>,
}

impl RenderCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Return the entry for `path` if it is still valid for the given
	/// modification time and width bucket.
	pub fn lookup(&self, path: &Path, modified: SystemTime, width: u16) -> Option<&RenderCacheEntry> {
		self.entries
			.get(path)
			.filter(|entry| entry.matches(modified, width))
	}

	/// Return the entry for `path` regardless of staleness.
	pub fn get(&self, path: &Path) -> Option<&RenderCacheEntry> {
		self.entries.get(path)
	}

	/// Store an entry, replacing whatever was cached for the path.
	pub fn insert(&mut self, path: PathBuf, entry: RenderCacheEntry) {
		self.entries.insert(path, entry);
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	fn entry(modified: SystemTime, width: u16) -> RenderCacheEntry {
		RenderCacheEntry {
			modified,
			width,
			output: "out".into(),
			raw: "raw".into(),
		}
	}

	#[test]
	fn lookup_requires_exact_timestamp_and_width() {
		let now = SystemTime::now();
		let path = PathBuf::from("/notes/a.md");
		let mut cache = RenderCache::new();
		cache.insert(path.clone(), entry(now, 80));

		assert!(cache.lookup(&path, now, 80).is_some());
		assert!(cache.lookup(&path, now, 100).is_none());
		assert!(
			cache
				.lookup(&path, now + Duration::from_nanos(1), 80)
				.is_none()
		);
		assert!(cache.get(&path).is_some());
	}

	#[test]
	fn insert_overwrites_previous_entry() {
		let now = SystemTime::now();
		let path = PathBuf::from("/notes/a.md");
		let mut cache = RenderCache::new();
		cache.insert(path.clone(), entry(now, 80));
		cache.insert(path.clone(), entry(now, 100));

		assert_eq!(cache.len(), 1);
		assert_eq!(cache.get(&path).map(|entry| entry.width), Some(100));

		cache.clear();
		assert!(cache.is_empty());
	}
}
