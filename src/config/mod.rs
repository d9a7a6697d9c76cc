//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, table layout, retry policy)
//! - Connection settings (`DbConfig`)
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    validate_database_name, Backend, Command, Config, DbConfig, LogFormat, LogLevel, OutputFormat,
};
