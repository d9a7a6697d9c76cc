//! Error type definitions.
//!
//! One error enum per collaborator: connecting, provisioning, importing and
//! querying. The binary wraps them in `anyhow` with context.

use std::path::PathBuf;

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// A configuration value that failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field}: {message}")]
pub struct ConfigValidationError {
    /// Name of the offending setting
    pub field: &'static str,
    /// What is wrong and what is expected instead
    pub message: String,
}

impl ConfigValidationError {
    /// Creates a validation error for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// The server (or SQLite file) could not be reached.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// The connection settings do not form a valid URL.
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    /// The driver failed to open the connection.
    #[error("Failed to connect to {target}: {source}")]
    ConnectFailed {
        /// Server or file description (never includes the password)
        target: String,
        /// Driver error
        #[source]
        source: sqlx::Error,
    },
}

/// Schema setup failed.
#[derive(Error, Debug)]
pub enum ProvisioningError {
    /// The database name cannot be used as an identifier.
    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(#[from] ConfigValidationError),

    /// Error creating the SQLite database file or its directory.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// `CREATE DATABASE` failed (permissions, lost connection).
    #[error("Failed to create database {database}: {source}")]
    CreateDatabase {
        /// Database name
        database: String,
        /// Driver error
        #[source]
        source: sqlx::Error,
    },

    /// `CREATE TABLE` failed.
    #[error("Failed to create table {table}: {source}")]
    CreateTable {
        /// Table name
        table: &'static str,
        /// Driver error
        #[source]
        source: sqlx::Error,
    },
}

/// A CSV file could not be imported.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The CSV file does not exist.
    #[error("CSV file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The CSV file could not be opened or parsed.
    #[error("Failed to read CSV {}: {source}", path.display())]
    Read {
        /// CSV path
        path: PathBuf,
        /// Reader error
        #[source]
        source: csv::Error,
    },

    /// The header row lacks a required column.
    #[error("CSV header is missing the required column {0:?}")]
    MissingColumn(&'static str),

    /// A row has no value for a required column.
    #[error("Line {line}: missing required field {field:?}")]
    MissingField {
        /// 1-based line in the CSV file
        line: u64,
        /// Column name
        field: &'static str,
    },

    /// The age is not a non-negative decimal.
    #[error("Line {line}: invalid age {value:?} ({reason})")]
    InvalidAge {
        /// 1-based line in the CSV file
        line: u64,
        /// Raw field value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The user_id does not fit the `VARCHAR(36)` column.
    #[error("Line {line}: user_id {value:?} is longer than {max} characters")]
    UserIdTooLong {
        /// 1-based line in the CSV file
        line: u64,
        /// Raw field value
        value: String,
        /// Column width
        max: usize,
    },

    /// Inserting the parsed rows failed.
    #[error("SQL error while importing: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Fetching or decoding rows failed.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The query failed (missing table, dropped connection, ...).
    #[error("Query failed: {0}")]
    SqlError(#[from] sqlx::Error),

    /// A column held a value that does not fit the record.
    #[error("Failed to decode column {column:?}: {message}")]
    Decode {
        /// Column name
        column: &'static str,
        /// Decoder message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation_error_display() {
        let err = ConfigValidationError::new("port", "must be greater than 0");
        assert_eq!(err.to_string(), "Invalid port: must be greater than 0");
    }

    #[test]
    fn test_connection_error_display_has_no_password() {
        let err = ConnectionError::ConnectFailed {
            target: "MySQL server localhost:3306".to_string(),
            source: sqlx::Error::PoolTimedOut,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to connect to MySQL server localhost:3306"));
    }

    #[test]
    fn test_import_error_messages_name_the_line() {
        let err = ImportError::MissingField {
            line: 4,
            field: "email",
        };
        assert_eq!(err.to_string(), "Line 4: missing required field \"email\"");

        let err = ImportError::InvalidAge {
            line: 7,
            value: "abc".to_string(),
            reason: "not a decimal".to_string(),
        };
        assert!(err.to_string().contains("Line 7"));
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn test_provisioning_error_from_validation() {
        let err: ProvisioningError = ConfigValidationError::new("database", "must not be empty").into();
        match err {
            ProvisioningError::InvalidDatabaseName(inner) => assert_eq!(inner.field, "database"),
            other => panic!("Expected InvalidDatabaseName, got {other:?}"),
        }
    }

    #[test]
    fn test_query_error_from_sqlx() {
        let err: QueryError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, QueryError::SqlError(sqlx::Error::RowNotFound)));
        assert!(err.to_string().starts_with("Query failed"));
    }
}
