// Shared test helpers for database setup and test data creation.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::{Path, PathBuf};

use sqlx::AnyConnection;

use user_stream::{connect, connect_to_named_database, create_database, create_table, DbConfig};

/// The two-row CSV used by most scenarios.
#[allow(dead_code)] // Used by other test files
pub const SAMPLE_CSV: &str = "user_id,name,email,age\nid1,Alice,a@x.com,30\nid2,Bob,b@x.com,25\n";

/// SQLite settings rooted in `dir`.
#[allow(dead_code)]
pub fn sqlite_config(dir: &Path) -> DbConfig {
    DbConfig::sqlite(dir.join("data"), "ALX_prodev")
}

/// Writes `contents` to `dir/name` and returns the path.
#[allow(dead_code)]
pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write CSV");
    path
}

/// Creates the database and table, then returns a connection to it.
#[allow(dead_code)]
pub async fn provisioned_connection(config: &DbConfig) -> AnyConnection {
    let mut server = connect(config).await.expect("Failed to connect to server");
    create_database(&mut server, config)
        .await
        .expect("Failed to create database");

    let mut conn = connect_to_named_database(config)
        .await
        .expect("Failed to connect to database");
    create_table(&mut conn).await.expect("Failed to create table");
    conn
}

/// Inserts `count` users numbered from 0 with ages 20, 21, ...
#[allow(dead_code)]
pub async fn insert_numbered_users(conn: &mut AnyConnection, count: usize) {
    for i in 0..count {
        sqlx::query("INSERT INTO user_data (user_id, name, email, age) VALUES (?, ?, ?, ?)")
            .bind(format!("user-{i:04}"))
            .bind(format!("User {i}"))
            .bind(format!("user{i}@example.com"))
            .bind(20 + (i % 60) as i64)
            .execute(&mut *conn)
            .await
            .expect("Failed to insert test user");
    }
}
