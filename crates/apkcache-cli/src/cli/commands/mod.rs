//! CLI command handlers, one per file.

mod check;
mod completions;
mod prune;
mod status;
mod sync;

pub use check::run_check;
pub use completions::run_completions;
pub use prune::run_prune;
pub use status::run_status;
pub use sync::run_sync;
