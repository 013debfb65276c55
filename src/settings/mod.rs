//! Configuration loading and resolution.
//!
//! Values are layered from config files, the environment and CLI flags, then
//! validated into a [`ResolvedConfig`]. `load` is the entry point.

mod loader;
mod raw;
mod resolved;
mod sources;

pub use loader::load;
pub use resolved::ResolvedConfig;
