//! Connection and transaction scoping.

use std::fmt;

use futures::future::BoxFuture;
use log::{debug, warn};
use sqlx::AnyConnection;
use sqlx::Connection;

use crate::config::DbConfig;
use crate::error_handling::ConnectionError;
use crate::storage::provision::connect_to_named_database;

/// Runs `op` on a fresh connection to the configured database.
///
/// The connection is closed whether `op` succeeds or fails. A failure to
/// close is logged and does not replace the result of `op`.
pub async fn with_connection<T, E, F>(config: &DbConfig, op: F) -> Result<T, E>
where
    F: for<'c> FnOnce(&'c mut AnyConnection) -> BoxFuture<'c, Result<T, E>>,
    E: From<ConnectionError>,
{
    let mut conn = connect_to_named_database(config).await?;
    let result = op(&mut conn).await;

    match conn.close().await {
        Ok(()) => debug!("Connection to {} closed", config.database),
        Err(e) => warn!("Failed to close connection to {}: {e}", config.database),
    }

    result
}

/// Runs `op` inside a transaction.
///
/// Commits when `op` succeeds. When it fails the transaction is rolled back,
/// a warning is logged and the error from `op` is returned unchanged.
pub async fn transactional<T, E, F>(conn: &mut AnyConnection, op: F) -> Result<T, E>
where
    F: for<'c> FnOnce(&'c mut AnyConnection) -> BoxFuture<'c, Result<T, E>>,
    E: From<sqlx::Error> + fmt::Display,
{
    let mut tx = conn.begin().await?;

    let result = op(&mut *tx).await;
    match result {
        Ok(value) => {
            tx.commit().await?;
            debug!("Transaction committed");
            Ok(value)
        }
        Err(e) => {
            warn!("Transaction rolled back: {e}");
            if let Err(rollback_error) = tx.rollback().await {
                warn!("Rollback failed: {rollback_error}");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::QueryError;
    use crate::storage::provision::{connect, count_users, create_database, create_table};
    use crate::storage::test_helpers::{create_test_connection, insert_test_user};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_transactional_commits_on_success() {
        let mut conn = create_test_connection().await;

        let inserted = transactional(&mut conn, |tx| {
            Box::pin(async move {
                insert_test_user(tx, "id1", "Alice", "a@x.com", 30).await;
                Ok::<_, QueryError>(1)
            })
        })
        .await
        .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(count_users(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_transactional_rolls_back_on_failure() {
        let mut conn = create_test_connection().await;

        let result: Result<(), QueryError> = transactional(&mut conn, |tx| {
            Box::pin(async move {
                insert_test_user(tx, "id1", "Alice", "a@x.com", 30).await;
                sqlx::query("SELECT * FROM missing_table")
                    .execute(&mut *tx)
                    .await?;
                Ok::<(), QueryError>(())
            })
        })
        .await;

        assert!(matches!(result, Err(QueryError::SqlError(_))));
        assert_eq!(count_users(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_with_connection_runs_against_named_database() {
        let temp_dir = TempDir::new().expect("temp dir");
        let config = DbConfig::sqlite(temp_dir.path(), "ALX_prodev");
        let mut server = connect(&config).await.unwrap();
        create_database(&mut server, &config).await.unwrap();

        let count = with_connection(&config, |conn| {
            Box::pin(async move {
                create_table(conn).await?;
                insert_test_user(conn, "id1", "Alice", "a@x.com", 30).await;
                Ok::<_, anyhow::Error>(count_users(conn).await?)
            })
        })
        .await
        .unwrap();

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_with_connection_reports_connection_failure() {
        let temp_dir = TempDir::new().expect("temp dir");
        let config = DbConfig::sqlite(temp_dir.path().join("missing"), "ALX_prodev");

        let result: Result<(), ConnectionError> =
            with_connection(&config, |_conn| Box::pin(async { Ok(()) })).await;
        assert!(matches!(result, Err(ConnectionError::ConnectFailed { .. })));
    }
    #[tokio::test]
    async fn test_with_connection_closes_after_failed_op() {
        let temp_dir = TempDir::new().expect("temp dir");
        let config = DbConfig::sqlite(temp_dir.path(), "ALX_prodev");
        let mut server = connect(&config).await.unwrap();
        create_database(&mut server, &config).await.unwrap();

        let result: Result<(), anyhow::Error> = with_connection(&config, |conn| {
            Box::pin(async move {
                create_table(conn).await?;
                // Holds the write lock until the connection goes away
                sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
                insert_test_user(conn, "id1", "Alice", "a@x.com", 30).await;
                Err(anyhow::anyhow!("op failed"))
            })
        })
        .await;
        assert_eq!(result.unwrap_err().to_string(), "op failed");

        // Closing rolled back the open transaction and released the lock
        let mut conn = connect_to_named_database(&config).await.unwrap();
        assert_eq!(count_users(&mut conn).await.unwrap(), 0);
        insert_test_user(&mut conn, "id2", "Bob", "b@x.com", 25).await;
        assert_eq!(count_users(&mut conn).await.unwrap(), 1);
    }
}
