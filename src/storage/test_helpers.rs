//! Shared test helpers for storage and stream module tests.
//!
//! This module provides common utilities for database setup and test data creation.

use sqlx::AnyConnection;
use sqlx::Connection;

use crate::initialization::install_drivers;
use crate::storage::provision::create_table;

/// Opens an in-memory SQLite connection with `user_data` created.
pub async fn create_test_connection() -> AnyConnection {
    install_drivers();
    let mut conn = AnyConnection::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    create_table(&mut conn)
        .await
        .expect("Failed to create user_data");
    conn
}

/// Inserts one user row directly, bypassing the importer.
pub async fn insert_test_user(
    conn: &mut AnyConnection,
    user_id: &str,
    name: &str,
    email: &str,
    age: i64,
) {
    sqlx::query("INSERT INTO user_data (user_id, name, email, age) VALUES (?, ?, ?, ?)")
        .bind(user_id)
        .bind(name)
        .bind(email)
        .bind(age)
        .execute(&mut *conn)
        .await
        .expect("Failed to insert test user");
}

/// Inserts `count` users named `user-000`, `user-001`, ... with ages 20, 21, ...
pub async fn insert_numbered_users(conn: &mut AnyConnection, count: usize) {
    for i in 0..count {
        insert_test_user(
            conn,
            &format!("user-{i:03}"),
            &format!("User {i}"),
            &format!("user{i}@example.com"),
            20 + i as i64,
        )
        .await;
    }
}
