//! Application initialization.
//!
//! This module provides functions to set up process-wide resources:
//! - Logger (plain or JSON)
//! - `sqlx::Any` drivers (MySQL and SQLite)

mod logger;

// Re-export public API
pub use logger::init_logger_with;

/// Registers the MySQL and SQLite drivers with `sqlx::Any`.
///
/// Must run before the first connection is opened. Calling it more than once
/// is harmless.
pub fn install_drivers() {
    sqlx::any::install_default_drivers();
}
