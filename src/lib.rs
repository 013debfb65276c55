//! Terminal notes browser with cached, debounced markdown previews that follow
//! changes made to the notes tree on disk.
//!
//! [`render`] holds the preview pipeline, [`watch`] the polling change
//! detector, and [`ui`] the interactive loop tying them together.

pub mod app_dirs;
pub mod logging;
pub mod render;
pub mod ui;
pub mod watch;

pub use render::{RenderOptions, RenderStyle};
pub use ui::App;
pub use watch::WatchOptions;
