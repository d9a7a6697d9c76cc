//! Driver helpers.
//!
//! Output formatting and progress logging used by the `run` driver.

pub mod logging;
pub(crate) mod output;

// Re-export public API
pub use logging::maybe_log_progress;
pub(crate) use output::RecordWriter;
