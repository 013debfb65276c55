use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, warn};

/// Sorted listing of the markdown notes below the root.
///
/// Hidden files and anything excluded by ignore files are left out, as is the
/// reserved metadata directory. An optional filter narrows the visible notes;
/// the cursor always indexes the visible ones.
#[derive(Debug)]
pub struct NoteList {
	root: PathBuf,
	reserved: String,
	all: Vec<PathBuf>,
	notes: Vec<PathBuf>,
	filter: Option<HashSet<PathBuf>>,
	selected: Option<usize>,
}

impl NoteList {
	pub fn load(root: impl Into<PathBuf>, reserved: impl Into<String>) -> Self {
		let mut list = Self {
			root: root.into(),
			reserved: reserved.into(),
			all: Vec::new(),
			notes: Vec::new(),
			filter: None,
			selected: None,
		};
		list.rebuild();
		list
	}

	/// Re-read the tree, keeping the cursor on the same note when it still
	/// exists.
	pub fn rebuild(&mut self) {
		self.all = collect_notes(&self.root, &self.reserved);
		debug!(count = self.all.len(), "rebuilt note listing");
		self.apply_view();
	}

	/// Show only the notes in `matches`, or every note for `None`.
	pub fn set_filter(&mut self, matches: Option<Vec<PathBuf>>) {
		self.filter = matches.map(|paths| paths.into_iter().collect());
		self.apply_view();
	}

	pub fn is_filtered(&self) -> bool {
		self.filter.is_some()
	}

	/// Number of notes before filtering.
	pub fn total(&self) -> usize {
		self.all.len()
	}

	fn apply_view(&mut self) {
		let previous = self.selected_path().map(Path::to_path_buf);
		let previous_index = self.selected;
		self.notes = match &self.filter {
			Some(filter) => self
				.all
				.iter()
				.filter(|note| filter.contains(*note))
				.cloned()
				.collect(),
			None => self.all.clone(),
		};

		self.selected = if self.notes.is_empty() {
			None
		} else {
			previous
				.and_then(|path| self.notes.iter().position(|note| *note == path))
				.or_else(|| previous_index.map(|index| index.min(self.notes.len() - 1)))
				.or(Some(0))
		};
	}

	pub fn notes(&self) -> &[PathBuf] {
		&self.notes
	}

	pub fn len(&self) -> usize {
		self.notes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.notes.is_empty()
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn selected_index(&self) -> Option<usize> {
		self.selected
	}

	pub fn selected_path(&self) -> Option<&Path> {
		self.selected
			.and_then(|index| self.notes.get(index))
			.map(PathBuf::as_path)
	}

	/// Move the cursor by `delta`, clamped to the listing. Returns `true` when
	/// the selection changed.
	pub fn move_by(&mut self, delta: isize) -> bool {
		let Some(current) = self.selected else {
			return false;
		};
		let last = self.notes.len().saturating_sub(1);
		let next = current.saturating_add_signed(delta).min(last);
		self.selected = Some(next);
		next != current
	}

	pub fn select_first(&mut self) -> bool {
		self.select_index(0)
	}

	pub fn select_last(&mut self) -> bool {
		self.select_index(self.notes.len().saturating_sub(1))
	}

	fn select_index(&mut self, index: usize) -> bool {
		if self.notes.is_empty() || self.selected == Some(index) {
			return false;
		}
		self.selected = Some(index);
		true
	}

	/// Path of `note` relative to the root, with forward slashes.
	pub fn label(&self, note: &Path) -> String {
		note.strip_prefix(&self.root)
			.unwrap_or(note)
			.to_string_lossy()
			.replace('\\', "/")
	}
}

pub(crate) fn collect_notes(root: &Path, reserved: &str) -> Vec<PathBuf> {
	let reserved = reserved.to_string();
	let walker = WalkBuilder::new(root)
		.hidden(true)
		.git_ignore(true)
		.git_global(true)
		.git_exclude(true)
		.ignore(true)
		.parents(true)
		.require_git(false)
		.follow_links(false)
		.filter_entry(move |entry| {
			entry.depth() == 0 || entry.file_name().to_str() != Some(reserved.as_str())
		})
		.build();

	let mut notes: Vec<PathBuf> = walker
		.filter_map(|entry| match entry {
			Ok(entry) => Some(entry),
			Err(err) => {
				warn!(root = %root.display(), error = %err, "skipping unreadable entry");
				None
			}
		})
		.filter(|entry| entry.file_type().is_some_and(|kind| kind.is_file()))
		.filter(|entry| is_markdown(entry.path()))
		.map(ignore::DirEntry::into_path)
		.collect();

	notes.sort_by(|left, right| compare_case_insensitive(left, right));
	notes
}

fn is_markdown(path: &Path) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

fn compare_case_insensitive(left: &Path, right: &Path) -> Ordering {
	let left_key = left.to_string_lossy().to_lowercase();
	let right_key = right.to_string_lossy().to_lowercase();
	left_key.cmp(&right_key).then_with(|| left.cmp(right))
}

#[cfg(test)]
mod tests {
	use std::fs;

	use tempfile::tempdir;

	use super::*;

	fn labels(list: &NoteList) -> Vec<String> {
		list.notes().iter().map(|note| list.label(note)).collect()
	}

	#[test]
	fn lists_markdown_notes_sorted() {
		let dir = tempdir().unwrap();
		fs::create_dir(dir.path().join("Projects")).unwrap();
		fs::write(dir.path().join("zeta.md"), "").unwrap();
		fs::write(dir.path().join("Alpha.MD"), "").unwrap();
		fs::write(dir.path().join("Projects/plan.md"), "").unwrap();
		fs::write(dir.path().join("image.png"), "").unwrap();

		let list = NoteList::load(dir.path(), ".marginalia");

		assert_eq!(labels(&list), vec!["Alpha.MD", "Projects/plan.md", "zeta.md"]);
		assert_eq!(list.selected_index(), Some(0));
	}

	#[test]
	fn skips_hidden_ignored_and_reserved_entries() {
		let dir = tempdir().unwrap();
		fs::create_dir(dir.path().join(".marginalia")).unwrap();
		fs::write(dir.path().join(".marginalia/draft.md"), "").unwrap();
		fs::write(dir.path().join(".secret.md"), "").unwrap();
		fs::write(dir.path().join(".gitignore"), "scratch.md\n").unwrap();
		fs::write(dir.path().join("scratch.md"), "").unwrap();
		fs::write(dir.path().join("kept.md"), "").unwrap();

		let list = NoteList::load(dir.path(), ".marginalia");

		assert_eq!(labels(&list), vec!["kept.md"]);
	}

	#[test]
	fn rebuild_keeps_selection_on_same_note() {
		let dir = tempdir().unwrap();
		fs::write(dir.path().join("b.md"), "").unwrap();
		fs::write(dir.path().join("c.md"), "").unwrap();
		let mut list = NoteList::load(dir.path(), ".marginalia");
		list.move_by(1);
		assert_eq!(list.selected_path(), Some(dir.path().join("c.md").as_path()));

		fs::write(dir.path().join("a.md"), "").unwrap();
		list.rebuild();

		assert_eq!(list.selected_path(), Some(dir.path().join("c.md").as_path()));
		assert_eq!(list.selected_index(), Some(2));
	}

	#[test]
	fn rebuild_clamps_when_selected_note_disappears() {
		let dir = tempdir().unwrap();
		fs::write(dir.path().join("a.md"), "").unwrap();
		fs::write(dir.path().join("b.md"), "").unwrap();
		let mut list = NoteList::load(dir.path(), ".marginalia");
		list.select_last();

		fs::remove_file(dir.path().join("b.md")).unwrap();
		list.rebuild();
		assert_eq!(list.selected_path(), Some(dir.path().join("a.md").as_path()));

		fs::remove_file(dir.path().join("a.md")).unwrap();
		list.rebuild();
		assert_eq!(list.selected_path(), None);
	}

	#[test]
	fn filter_narrows_visible_notes_and_survives_rebuild() {
		let dir = tempdir().unwrap();
		for name in ["a.md", "b.md", "c.md"] {
			fs::write(dir.path().join(name), "").unwrap();
		}
		let mut list = NoteList::load(dir.path(), ".marginalia");
		list.select_last();

		list.set_filter(Some(vec![dir.path().join("a.md"), dir.path().join("c.md")]));
		assert_eq!(labels(&list), vec!["a.md", "c.md"]);
		assert_eq!(list.selected_path(), Some(dir.path().join("c.md").as_path()));
		assert_eq!((list.len(), list.total()), (2, 3));

		fs::remove_file(dir.path().join("a.md")).unwrap();
		list.rebuild();
		assert_eq!(labels(&list), vec!["c.md"]);

		list.set_filter(None);
		assert!(!list.is_filtered());
		assert_eq!(labels(&list), vec!["b.md", "c.md"]);
		assert_eq!(list.selected_path(), Some(dir.path().join("c.md").as_path()));
	}

	#[test]
	fn movement_is_clamped() {
		let dir = tempdir().unwrap();
		fs::write(dir.path().join("a.md"), "").unwrap();
		fs::write(dir.path().join("b.md"), "").unwrap();
		let mut list = NoteList::load(dir.path(), ".marginalia");

		assert!(!list.move_by(-1));
		assert!(list.move_by(5));
		assert_eq!(list.selected_index(), Some(1));
		assert!(list.select_first());
	}
}
