use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use ratatui::widgets::ListState;
use throbber_widgets_tui::ThrobberState;
use tracing::{debug, warn};

use crate::render::{
	Display, MarkdownFactory, PendingRender, RenderOptions, RenderRequest, RenderResult,
	RenderScheduler, RendererPool, ResultDisposition, spawn_render,
};
use crate::watch::{
	ChangeDetector, ExternalChange, WatchOptions, WorkspaceHooks,
	apply_external_change,
};

use super::events::{self, AppEvent};
use super::notes::NoteList;
use super::search::SearchIndex;

pub(crate) const AUTO_REFRESH_STATUS: &str = "Auto-refreshed (external filesystem changes detected)";

/// Collaborators invalidated when the tree changes on disk.
#[derive(Debug)]
pub(crate) struct Workspace {
	pub(crate) notes: NoteList,
	pub(crate) search: SearchIndex,
	/// Note currently open in an external editor.
	pub(crate) editing: Option<PathBuf>,
}

impl WorkspaceHooks for Workspace {
	fn rebuild_listing(&mut self) {
		self.notes.rebuild();
	}

	fn invalidate_search_index(&mut self) {
		self.search.invalidate();
	}

	fn is_editing(&self, path: &Path) -> bool {
		self.editing.as_deref() == Some(path)
	}
}

/// Application state for the notes browser.
///
/// Everything here is owned and mutated by the interactive loop. Background
/// renders and timers only talk back through the event channel.
pub struct App {
	pub(crate) workspace: Workspace,
	pub(crate) scheduler: RenderScheduler,
	pub(crate) pool: Arc<RendererPool<MarkdownFactory>>,
	pub(crate) detector: ChangeDetector,
	/// Note shown in the preview pane.
	pub(crate) current: Option<PathBuf>,
	pub(crate) status: String,
	pub(crate) list_state: ListState,
	pub(crate) throbber_state: ThrobberState,
	pub(crate) scroll: u16,
	/// Preview offsets remembered per note.
	pub(crate) offsets: HashMap<PathBuf, u16>,
	pub(crate) preview_height: u16,
	/// Filter query applied to the note list.
	pub(crate) query: String,
	/// Keystrokes edit `query` instead of driving navigation.
	pub(crate) filter_input: bool,
	/// `status` holds a render error that a later success should clear.
	render_error_shown: bool,
	events_tx: mpsc::Sender<AppEvent>,
	events_rx: mpsc::Receiver<AppEvent>,
}

impl App {
	pub fn new(root: impl Into<PathBuf>, render: &RenderOptions, watch: &WatchOptions) -> Self {
		let root = root.into();
		let (events_tx, events_rx) = mpsc::channel();
		Self {
			workspace: Workspace {
				notes: NoteList::load(root.clone(), watch.reserved_dir.clone()),
				search: SearchIndex::new(root.clone(), watch.reserved_dir.clone()),
				editing: None,
			},
			scheduler: RenderScheduler::new(render),
			pool: Arc::new(RendererPool::new(
				MarkdownFactory::new(render.style),
				render.pool_capacity,
			)),
			detector: ChangeDetector::new(root, watch),
			current: None,
			status: String::new(),
			list_state: ListState::default(),
			throbber_state: ThrobberState::default(),
			scroll: 0,
			offsets: HashMap::new(),
			preview_height: 0,
			query: String::new(),
			filter_input: false,
			render_error_shown: false,
			events_tx,
			events_rx,
		}
	}

	/// Establish the watch baseline, arm the next tick and show the first
	/// note.
	pub(crate) fn start(&mut self) {
		let outcome = self.detector.tick();
		debug!(?outcome, "initial watch scan");
		self.schedule_watch_tick();
		self.show_selected();
	}

	pub fn notes(&self) -> &NoteList {
		&self.workspace.notes
	}

	pub fn current(&self) -> Option<&Path> {
		self.current.as_deref()
	}

	pub fn status(&self) -> &str {
		&self.status
	}

	pub fn display(&self) -> &Display {
		self.scheduler.display()
	}

	/// Wait up to `timeout` for the next event.
	pub(crate) fn next_event(&self, timeout: Duration) -> Option<AppEvent> {
		self.events_rx.recv_timeout(timeout).ok()
	}

	pub(crate) fn try_next_event(&self) -> Option<AppEvent> {
		self.events_rx.try_recv().ok()
	}

	pub(crate) fn sender(&self) -> mpsc::Sender<AppEvent> {
		self.events_tx.clone()
	}

	/// Make the listing's selection the displayed note and request it.
	pub(crate) fn show_selected(&mut self) {
		self.remember_offset();
		self.current = self.workspace.notes.selected_path().map(Path::to_path_buf);
		self.scroll = 0;
		match self.current.clone() {
			Some(path) => {
				let pending = self.scheduler.request_render(&path);
				self.arm(pending);
			}
			None => self.scheduler.clear_display(),
		}
		self.restore_offset();
	}

	pub(crate) fn refresh(&mut self) {
		self.remember_offset();
		let pending = self.scheduler.refresh(self.current.as_deref());
		self.arm(pending);
		self.restore_offset();
	}

	/// Re-run the list filter against the search index.
	pub(crate) fn apply_filter(&mut self) {
		let previous = self.workspace.notes.selected_path().map(Path::to_path_buf);
		let matches = if self.query.trim().is_empty() {
			None
		} else {
			Some(self.workspace.search.search(&self.query))
		};
		self.workspace.notes.set_filter(matches);
		if self.workspace.notes.selected_path() != previous.as_deref() {
			self.show_selected();
		}
	}

	fn remember_offset(&mut self) {
		if let Some(path) = self.current.clone() {
			self.offsets.insert(path, self.scroll);
		}
	}

	/// Scroll to the remembered offset of the current note once its output
	/// is displayed, clamped to the output's length.
	fn restore_offset(&mut self) {
		if !matches!(self.scheduler.display(), Display::Rendered { .. }) {
			return;
		}
		let remembered = self
			.current
			.as_ref()
			.and_then(|path| self.offsets.get(path))
			.copied()
			.unwrap_or(0);
		self.scroll = remembered.min(self.max_scroll());
	}

	/// Track the terminal width; a new width bucket re-requests the note.
	pub(crate) fn resize(&mut self, columns: u16) {
		let preview = super::render::preview_columns(columns);
		if self.scheduler.set_viewport_width(preview) {
			debug!(columns, preview, width = self.scheduler.width(), "preview width bucket changed");
			self.refresh();
		}
	}

	pub(crate) fn handle_render_due(&mut self, request: RenderRequest) {
		if !self.scheduler.is_current(&request) {
			debug!(generation = request.generation, "skipping superseded render");
			return;
		}

		let sender = self.events_tx.clone();
		let path = request.path.clone();
		let spawned = spawn_render(request, Arc::clone(&self.pool), move |result| {
			let _ = sender.send(AppEvent::RenderDone(result));
		});
		if let Err(err) = spawned {
			warn!(path = %path.display(), error = %err, "failed to start render worker");
			self.show_render_error(format!("Could not start render: {err}"));
		}
	}

	pub(crate) fn handle_render_done(&mut self, result: RenderResult) {
		let path = result.path.clone();
		match self.scheduler.accept_result(result) {
			ResultDisposition::Applied => {
				if self.render_error_shown {
					self.status.clear();
					self.render_error_shown = false;
				}
				self.restore_offset();
			}
			ResultDisposition::Failed => {
				let label = self.workspace.notes.label(&path);
				self.show_render_error(format!("Could not read {label}"));
			}
			ResultDisposition::Stale => {}
		}
	}

	fn show_render_error(&mut self, message: String) {
		self.status = message;
		self.render_error_shown = true;
	}

	pub(crate) fn handle_watch_tick(&mut self) {
		if self.detector.tick().is_changed() {
			self.remember_offset();
			let change = apply_external_change(
				&mut self.scheduler,
				&mut self.workspace,
				self.current.as_deref(),
			);
			debug!(?change, "applied external change");
			match change {
				ExternalChange::Rerendered { pending } => {
					self.arm(pending);
					self.restore_offset();
				}
				ExternalChange::SelectionCleared => {
					self.current = None;
					self.scroll = 0;
				}
				ExternalChange::EditingPreserved | ExternalChange::NoSelection => {}
			}
			if !self.query.trim().is_empty() {
				self.apply_filter();
			}
			self.status = AUTO_REFRESH_STATUS.to_string();
			self.render_error_shown = false;
		}
		self.schedule_watch_tick();
	}

	fn schedule_watch_tick(&mut self) {
		let delay = self.detector.next_tick();
		if let Err(err) = events::schedule(&self.events_tx, delay, AppEvent::WatchTick) {
			warn!(error = %err, "failed to schedule watch tick");
		}
	}

	/// Start the debounce timer for a cache miss.
	fn arm(&mut self, pending: Option<PendingRender>) {
		let Some(PendingRender { request, delay }) = pending else {
			return;
		};
		if let Err(err) = events::schedule(&self.events_tx, delay, AppEvent::RenderDue(request)) {
			warn!(error = %err, "failed to schedule render");
			self.show_render_error(format!("Could not schedule render: {err}"));
		}
	}
}
