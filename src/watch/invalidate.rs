use std::path::Path;

use tracing::{debug, info};

use crate::render::{PendingRender, RenderScheduler};

/// State derived from the notes tree that must follow external changes.
pub trait WorkspaceHooks {
	/// Rebuild the note listing from disk.
	fn rebuild_listing(&mut self);

	fn invalidate_search_index(&mut self) {}

	/// Whether `path` is open in an editor session.
	fn is_editing(&self, path: &Path) -> bool;
}

/// How the displayed note was handled after an external change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalChange {
	/// The current note was re-requested; `pending` is `None` only if the
	/// scheduler served it without deferring.
	Rerendered { pending: Option<PendingRender> },
	/// The current note is being edited and its display was left alone.
	EditingPreserved,
	/// The current note no longer exists; the preview was cleared.
	SelectionCleared,
	NoSelection,
}

/// Invalidate everything derived from the tree after a detected change.
///
/// The whole render cache is dropped regardless of which paths changed.
pub fn apply_external_change<H>(
	scheduler: &mut RenderScheduler,
	hooks: &mut H,
	current: Option<&Path>,
) -> ExternalChange
where
	H: WorkspaceHooks + ?Sized,
{
	scheduler.clear_cache();
	hooks.rebuild_listing();
	hooks.invalidate_search_index();

	let Some(path) = current else {
		return ExternalChange::NoSelection;
	};

	if !path.exists() {
		info!(path = %path.display(), "current note removed externally");
		scheduler.clear_display();
		return ExternalChange::SelectionCleared;
	}

	if hooks.is_editing(path) {
		debug!(path = %path.display(), "note is being edited, keeping display");
		return ExternalChange::EditingPreserved;
	}

	ExternalChange::Rerendered {
		pending: scheduler.request_render(path),
	}
}
