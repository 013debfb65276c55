//! Interactive terminal front-end for browsing notes.
//!
//! [`App`] owns all loop state. Input, debounce timers, background renders
//! and watch ticks arrive as [`AppEvent`]s on a single channel and are
//! handled one at a time.

mod actions;
mod ansi;
mod events;
mod notes;
mod render;
mod runtime;
mod search;
mod state;

pub use events::AppEvent;
pub use notes::NoteList;
pub use search::SearchIndex;
pub use state::App;
