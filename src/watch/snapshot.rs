use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use ignore::WalkBuilder;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
	#[error("failed to scan {}: {source}", root.display())]
	Walk {
		root: PathBuf,
		#[source]
		source: ignore::Error,
	},
}

/// Observable attributes of one filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
	/// Modification time in nanoseconds relative to the Unix epoch.
	pub modified_nanos: i128,
	pub size: u64,
	pub is_dir: bool,
}

impl EntryStat {
	fn from_metadata(metadata: &Metadata) -> Self {
		let modified_nanos = match metadata.modified() {
			Ok(time) => match time.duration_since(UNIX_EPOCH) {
				Ok(after) => after.as_nanos() as i128,
				Err(before) => -(before.duration().as_nanos() as i128),
			},
			Err(_) => 0,
		};
		Self {
			modified_nanos,
			size: metadata.len(),
			is_dir: metadata.is_dir(),
		}
	}
}

/// Every entry below a root, keyed by absolute path.
///
/// Equality is the change trigger: two snapshots are equal only when they hold
/// the same paths with identical attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
	entries: BTreeMap<PathBuf, EntryStat>,
}

impl Snapshot {
	/// Walk `root` and record every entry except the root itself.
	///
	/// Hidden and ignored files are included, symlinks are not followed, and
	/// any entry named `reserved` is skipped together with its subtree. The
	/// first walk or metadata error aborts the scan.
	pub fn scan(root: &Path, reserved: &str) -> Result<Self, WatchError> {
		let reserved = reserved.to_string();
		let walker = WalkBuilder::new(root)
			.standard_filters(false)
			.follow_links(false)
			.filter_entry(move |entry| {
				entry.depth() == 0 || entry.file_name().to_str() != Some(reserved.as_str())
			})
			.build();

		let walk_error = |source| WatchError::Walk {
			root: root.to_path_buf(),
			source,
		};

		let mut entries = BTreeMap::new();
		for entry in walker {
			let entry = entry.map_err(walk_error)?;
			if entry.depth() == 0 {
				continue;
			}
			let metadata = entry.metadata().map_err(walk_error)?;
			entries.insert(entry.into_path(), EntryStat::from_metadata(&metadata));
		}

		Ok(Self { entries })
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, path: &Path) -> Option<&EntryStat> {
		self.entries.get(path)
	}

	pub fn iter(&self) -> btree_map::Iter<'_, PathBuf, EntryStat> {
		self.entries.iter()
	}
}

impl FromIterator<(PathBuf, EntryStat)> for Snapshot {
	fn from_iter<I: IntoIterator<Item = (PathBuf, EntryStat)>>(iter: I) -> Self {
		Self {
			entries: iter.into_iter().collect(),
		}
	}
}
