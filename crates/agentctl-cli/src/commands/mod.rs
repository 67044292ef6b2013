//! Command implementations

pub mod sync;
pub mod targets;
pub mod translate;

pub use sync::{is_interactive, run_sync_commands};
pub use targets::run_targets;
pub use translate::run_translate;
