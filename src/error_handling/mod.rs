//! Error handling.
//!
//! This module provides:
//! - Error type definitions, one enum per collaborator
//! - Retriability classification for driver errors
//! - Retry strategy configuration

mod categorization;
mod types;

// Re-export public API
pub use categorization::{get_retry_strategy, Retriable};
pub use types::{
    ConfigValidationError, ConnectionError, ImportError, InitializationError, ProvisioningError,
    QueryError,
};
