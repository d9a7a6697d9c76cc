//! Connections and schema provisioning.
//!
//! Every function takes the connection settings explicitly and is idempotent:
//! creating a database or table that already exists is not an error.

use std::fs::OpenOptions;
use std::io::ErrorKind;

use log::{debug, error, info};
use sqlx::{AnyConnection, Connection};

use crate::config::{validate_database_name, Backend, DbConfig, USER_TABLE};
use crate::error_handling::{ConnectionError, ProvisioningError, QueryError};
use crate::initialization::install_drivers;
use crate::middleware::log_query;
use crate::storage::queries::{COUNT_USERS, CREATE_USER_TABLE};

/// Opens a connection to the server without selecting a database.
///
/// For SQLite this is an in-memory connection; the database file itself is
/// created by [`create_database`].
pub async fn connect(config: &DbConfig) -> Result<AnyConnection, ConnectionError> {
    let target = match config.backend {
        Backend::Mysql => format!("MySQL server {}:{}", config.host, config.port),
        Backend::Sqlite => "in-memory SQLite".to_string(),
    };
    open(&config.server_url()?, target).await
}

/// Opens a connection to the configured database.
pub async fn connect_to_named_database(
    config: &DbConfig,
) -> Result<AnyConnection, ConnectionError> {
    let target = match config.backend {
        Backend::Mysql => format!(
            "MySQL database {} on {}:{}",
            config.database, config.host, config.port
        ),
        Backend::Sqlite => format!("SQLite database {}", config.sqlite_path().display()),
    };
    open(&config.database_url()?, target).await
}

async fn open(url: &str, target: String) -> Result<AnyConnection, ConnectionError> {
    install_drivers();
    match AnyConnection::connect(url).await {
        Ok(conn) => {
            debug!("Connected to {target}");
            Ok(conn)
        }
        Err(source) => {
            error!("Failed to connect to {target}: {source}");
            Err(ConnectionError::ConnectFailed { target, source })
        }
    }
}

/// Creates the configured database if it does not exist.
///
/// MySQL runs `CREATE DATABASE IF NOT EXISTS` on the server connection.
/// SQLite creates the data directory and an empty database file; `conn` is
/// not used.
pub async fn create_database(
    conn: &mut AnyConnection,
    config: &DbConfig,
) -> Result<(), ProvisioningError> {
    validate_database_name(&config.database)?;

    match config.backend {
        Backend::Mysql => {
            // Identifiers cannot be bound; the name was validated above
            let statement = format!("CREATE DATABASE IF NOT EXISTS `{}`", config.database);
            sqlx::query(&statement)
                .execute(&mut *conn)
                .await
                .map_err(|source| {
                    error!("Failed to create database {}: {source}", config.database);
                    ProvisioningError::CreateDatabase {
                        database: config.database.clone(),
                        source,
                    }
                })?;
            info!("Database {} is ready", config.database);
        }
        Backend::Sqlite => {
            std::fs::create_dir_all(&config.data_dir).map_err(|e| {
                error!(
                    "Failed to create data directory {}: {e}",
                    config.data_dir.display()
                );
                ProvisioningError::FileCreationError(e.to_string())
            })?;

            let path = config.sqlite_path();
            match OpenOptions::new()
                .read(true)
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(_) => info!("Database file {} created", path.display()),
                Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
                    info!("Database file {} already exists", path.display())
                }
                Err(e) => {
                    error!("Failed to create database file: {e}");
                    return Err(ProvisioningError::FileCreationError(e.to_string()));
                }
            }
        }
    }

    Ok(())
}

/// Creates the `user_data` table if it does not exist.
pub async fn create_table(conn: &mut AnyConnection) -> Result<(), ProvisioningError> {
    sqlx::query(CREATE_USER_TABLE)
        .execute(&mut *conn)
        .await
        .map_err(|source| {
            error!("Failed to create table {USER_TABLE}: {source}");
            ProvisioningError::CreateTable {
                table: USER_TABLE,
                source,
            }
        })?;
    info!("Table {USER_TABLE} is ready");
    Ok(())
}

/// Number of rows currently in `user_data`.
pub async fn count_users(conn: &mut AnyConnection) -> Result<i64, QueryError> {
    let count = log_query(
        COUNT_USERS,
        sqlx::query_scalar::<_, i64>(COUNT_USERS).fetch_one(&mut *conn),
    )
    .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Connection;
    use crate::storage::test_helpers::{create_test_connection, insert_test_user};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_table_is_idempotent() {
        let mut conn = create_test_connection().await;
        create_table(&mut conn).await.expect("second create_table");
        assert_eq!(count_users(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_users() {
        let mut conn = create_test_connection().await;
        insert_test_user(&mut conn, "id1", "Alice", "a@x.com", 30).await;
        insert_test_user(&mut conn, "id2", "Bob", "b@x.com", 25).await;
        assert_eq!(count_users(&mut conn).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_count_users_without_table_is_query_error() {
        install_drivers();
        let mut conn = AnyConnection::connect("sqlite::memory:").await.unwrap();
        let err = count_users(&mut conn).await.unwrap_err();
        assert!(matches!(err, QueryError::SqlError(sqlx::Error::Database(_))));
    }

    #[tokio::test]
    async fn test_sqlite_provisioning_round_trip() {
        let temp_dir = TempDir::new().expect("temp dir");
        let config = DbConfig::sqlite(temp_dir.path().join("nested"), "ALX_prodev");

        let mut server = connect(&config).await.expect("server connection");
        create_database(&mut server, &config).await.expect("create database");
        // Second call finds the file and leaves it alone
        create_database(&mut server, &config).await.expect("create database again");
        server.close().await.unwrap();
        assert!(config.sqlite_path().exists());

        let mut conn = connect_to_named_database(&config).await.expect("named connection");
        create_table(&mut conn).await.expect("create table");
        insert_test_user(&mut conn, "id1", "Alice", "a@x.com", 30).await;
        conn.close().await.unwrap();

        // Data survives reconnecting
        let mut conn = connect_to_named_database(&config).await.unwrap();
        assert_eq!(count_users(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_database_rejects_bad_names() {
        let temp_dir = TempDir::new().expect("temp dir");
        let config = DbConfig::sqlite(temp_dir.path(), "../escape");
        let mut server = connect(&config).await.unwrap();

        let err = create_database(&mut server, &config).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::InvalidDatabaseName(_)));
        assert!(!temp_dir.path().join("../escape.db").exists());
    }

    #[tokio::test]
    async fn test_connect_to_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("temp dir");
        let config = DbConfig::sqlite(temp_dir.path().join("does/not/exist"), "ALX_prodev");

        let err = connect_to_named_database(&config).await.unwrap_err();
        match err {
            ConnectionError::ConnectFailed { target, .. } => {
                assert!(target.starts_with("SQLite database"));
            }
            other => panic!("Expected ConnectFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_mysql_server_is_connection_error() {
        let config = DbConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..Default::default()
        };
        let err = connect(&config).await.unwrap_err();
        assert!(matches!(err, ConnectionError::ConnectFailed { .. }));
        assert!(!err.to_string().contains(&config.password));
    }
}
