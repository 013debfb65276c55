//! Lazily built full-text index over note names and bodies.
//!
//! The index is built on the first query after creation or invalidation.
//! Invalidation is cheap: it only marks the index stale, and the next query
//! pays for the rebuild.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::notes::collect_notes;

/// Bodies larger than this are indexed by name only.
const MAX_INDEXED_BYTES: u64 = 1024 * 1024;

#[derive(Debug)]
struct SearchDoc {
	path: PathBuf,
	name: String,
	body: String,
}

impl SearchDoc {
	fn matches(&self, terms: &[String]) -> bool {
		terms
			.iter()
			.all(|term| self.name.contains(term.as_str()) || self.body.contains(term.as_str()))
	}
}

#[derive(Debug)]
pub struct SearchIndex {
	root: PathBuf,
	reserved: String,
	docs: Vec<SearchDoc>,
	ready: bool,
	builds: u64,
}

impl SearchIndex {
	/// Create an unbuilt index.
	pub fn new(root: impl Into<PathBuf>, reserved: impl Into<String>) -> Self {
		Self {
			root: root.into(),
			reserved: reserved.into(),
			docs: Vec::new(),
			ready: false,
			builds: 0,
		}
	}

	/// Mark the index stale; the next query rebuilds it.
	pub fn invalidate(&mut self) {
		self.ready = false;
	}

	pub fn is_ready(&self) -> bool {
		self.ready
	}

	/// Number of full builds performed so far.
	pub fn builds(&self) -> u64 {
		self.builds
	}

	pub fn ensure_built(&mut self) {
		if !self.ready {
			self.build();
		}
	}

	fn build(&mut self) {
		self.docs = collect_notes(&self.root, &self.reserved)
			.into_iter()
			.map(|path| {
				let name = path
					.strip_prefix(&self.root)
					.unwrap_or(&path)
					.to_string_lossy()
					.to_lowercase();
				let body = read_body(&path).to_lowercase();
				SearchDoc { path, name, body }
			})
			.collect();
		self.ready = true;
		self.builds += 1;
		debug!(documents = self.docs.len(), "built search index");
	}

	/// Notes whose name or body contains every whitespace-separated term,
	/// ignoring case. An empty query matches nothing.
	pub fn search(&mut self, query: &str) -> Vec<PathBuf> {
		let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
		if terms.is_empty() {
			return Vec::new();
		}
		self.ensure_built();
		self.docs
			.iter()
			.filter(|doc| doc.matches(&terms))
			.map(|doc| doc.path.clone())
			.collect()
	}
}

fn read_body(path: &Path) -> String {
	match fs::metadata(path) {
		Ok(metadata) if metadata.len() > MAX_INDEXED_BYTES => return String::new(),
		Ok(_) => {}
		Err(err) => {
			warn!(path = %path.display(), error = %err, "skipping note body in search index");
			return String::new();
		}
	}
	match fs::read(path) {
		Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
		Err(err) => {
			warn!(path = %path.display(), error = %err, "skipping note body in search index");
			String::new()
		}
	}
}

#[cfg(test)]
mod tests {
	use tempfile::tempdir;

	use super::*;

	#[test]
	fn index_is_built_on_first_query_only() {
		let dir = tempdir().unwrap();
		fs::write(dir.path().join("groceries.md"), "milk and eggs").unwrap();
		let mut index = SearchIndex::new(dir.path(), ".marginalia");
		assert!(!index.is_ready());

		assert_eq!(index.search("milk"), vec![dir.path().join("groceries.md")]);
		index.search("eggs");

		assert!(index.is_ready());
		assert_eq!(index.builds(), 1);
	}

	#[test]
	fn terms_match_names_or_bodies_case_insensitively() {
		let dir = tempdir().unwrap();
		fs::create_dir(dir.path().join("work")).unwrap();
		fs::write(dir.path().join("work/Roadmap.md"), "Quarterly goals").unwrap();
		fs::write(dir.path().join("journal.md"), "met about the roadmap").unwrap();
		fs::write(dir.path().join("misc.md"), "nothing here").unwrap();
		let mut index = SearchIndex::new(dir.path(), ".marginalia");

		assert_eq!(
			index.search("ROADMAP"),
			vec![dir.path().join("journal.md"), dir.path().join("work/Roadmap.md")]
		);
		assert_eq!(
			index.search("work goals"),
			vec![dir.path().join("work/Roadmap.md")]
		);
		assert!(index.search("   ").is_empty());
	}

	#[test]
	fn invalidation_picks_up_new_notes() {
		let dir = tempdir().unwrap();
		fs::write(dir.path().join("a.md"), "alpha").unwrap();
		let mut index = SearchIndex::new(dir.path(), ".marginalia");
		assert_eq!(index.search("beta").len(), 0);

		fs::write(dir.path().join("b.md"), "beta").unwrap();
		assert_eq!(index.search("beta").len(), 0);

		index.invalidate();
		assert_eq!(index.search("beta"), vec![dir.path().join("b.md")]);
		assert_eq!(index.builds(), 2);
	}

	#[test]
	fn reserved_directory_is_not_indexed() {
		let dir = tempdir().unwrap();
		fs::create_dir(dir.path().join(".marginalia")).unwrap();
		fs::write(dir.path().join(".marginalia/draft.md"), "secret").unwrap();
		let mut index = SearchIndex::new(dir.path(), ".marginalia");

		assert!(index.search("secret").is_empty());
	}
}
