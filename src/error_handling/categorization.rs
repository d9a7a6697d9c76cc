//! Error retriability and retry strategy.
//!
//! Transient failures (lost connections, pool timeouts, lock contention) are
//! worth another attempt; everything else fails the same way every time.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::{ConnectionError, ImportError, ProvisioningError, QueryError};

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR` (doubles delay each retry)
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Maximum retries: `RETRY_MAX_ATTEMPTS`
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    use crate::config::{RETRY_FACTOR, RETRY_INITIAL_DELAY_MS};

    // `ExponentialBackoff` yields `base^n * factor`, so the growth rate is
    // the base and the first delay is `base * factor`.
    ExponentialBackoff::from_millis(RETRY_FACTOR)
        .factor(RETRY_INITIAL_DELAY_MS / RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Errors that know whether another attempt could succeed.
pub trait Retriable {
    /// `true` when the failure is transient.
    fn is_retriable(&self) -> bool;
}

// MySQL reports SQLSTATE codes, SQLite its primary result codes.
const MYSQL_DEADLOCK: &str = "40001";
const MYSQL_LOCK_WAIT_TIMEOUT: &str = "HY000";
const SQLITE_BUSY: &str = "5";
const SQLITE_LOCKED: &str = "6";

/// Determines if a driver error is transient.
///
/// # Retriable Errors
///
/// - I/O and TLS failures (connection refused, reset, dropped)
/// - Pool timeouts and closed pools
/// - Protocol errors (usually a connection cut mid-packet)
/// - Deadlocks and busy/locked databases
///
/// # Non-Retriable Errors
///
/// - All other database errors (missing table, syntax, constraint violations)
/// - Decode and type errors
/// - Configuration errors
pub fn is_retriable_sqlx_error(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_lowercase();
            match db_err.code().as_deref() {
                Some(MYSQL_DEADLOCK) | Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => true,
                Some(MYSQL_LOCK_WAIT_TIMEOUT) => message.contains("lock wait timeout"),
                _ => message.contains("database is locked"),
            }
        }
        _ => false,
    }
}

impl Retriable for sqlx::Error {
    fn is_retriable(&self) -> bool {
        is_retriable_sqlx_error(self)
    }
}

impl Retriable for ConnectionError {
    fn is_retriable(&self) -> bool {
        match self {
            ConnectionError::InvalidUrl(_) => false,
            ConnectionError::ConnectFailed { source, .. } => is_retriable_sqlx_error(source),
        }
    }
}

impl Retriable for QueryError {
    fn is_retriable(&self) -> bool {
        match self {
            QueryError::SqlError(e) => is_retriable_sqlx_error(e),
            QueryError::Decode { .. } => false,
        }
    }
}

impl Retriable for ProvisioningError {
    fn is_retriable(&self) -> bool {
        match self {
            ProvisioningError::CreateDatabase { source, .. }
            | ProvisioningError::CreateTable { source, .. } => is_retriable_sqlx_error(source),
            _ => false,
        }
    }
}

impl Retriable for ImportError {
    fn is_retriable(&self) -> bool {
        match self {
            ImportError::SqlError(e) => is_retriable_sqlx_error(e),
            _ => false,
        }
    }
}

/// Walks the error chain and classifies the first error type it knows.
///
/// Unknown errors are treated as permanent.
impl Retriable for anyhow::Error {
    fn is_retriable(&self) -> bool {
        for cause in self.chain() {
            if let Some(e) = cause.downcast_ref::<ConnectionError>() {
                return e.is_retriable();
            }
            if let Some(e) = cause.downcast_ref::<ProvisioningError>() {
                return e.is_retriable();
            }
            if let Some(e) = cause.downcast_ref::<ImportError>() {
                return e.is_retriable();
            }
            if let Some(e) = cause.downcast_ref::<QueryError>() {
                return e.is_retriable();
            }
            if let Some(e) = cause.downcast_ref::<sqlx::Error>() {
                return is_retriable_sqlx_error(e);
            }
        }
        false
    }
}
