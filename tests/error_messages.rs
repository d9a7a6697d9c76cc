//! Tests to ensure error messages are actionable and consistent
//!
//! These tests verify that validation and driver errors name the offending
//! setting or file.

use tempfile::TempDir;
use user_stream::{connect_to_named_database, Command, Config, DbConfig};

#[test]
fn test_config_validation_errors_are_descriptive() {
    let mut config = Config::default();

    config.db.database = String::new();
    let err = config.validate().unwrap_err();
    assert_eq!(err.field, "database");
    assert!(err.message.contains("empty"));

    config = Config::default();
    config.db.database = "users; DROP TABLE x".to_string();
    let err = config.validate().unwrap_err();
    assert_eq!(err.field, "database");

    config = Config::default();
    config.db.host = "  ".to_string();
    let err = config.validate().unwrap_err();
    assert_eq!(err.field, "host");

    config = Config::default();
    config.command = Some(Command::Pages { page_size: 0 });
    let err = config.validate().unwrap_err();
    assert_eq!(err.field, "page_size");
    assert!(err.message.contains("greater than 0"));
}

#[test]
fn test_sqlite_ignores_server_settings() {
    let config = Config {
        db: DbConfig {
            host: String::new(),
            ..DbConfig::sqlite("./data", "ALX_prodev")
        },
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[tokio::test]
async fn test_connection_errors_name_the_target() {
    let dir = TempDir::new().unwrap();
    let config = DbConfig::sqlite(dir.path().join("missing"), "ALX_prodev");

    let err = connect_to_named_database(&config).await.unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Failed to connect to SQLite database"), "{message}");
    assert!(message.contains("ALX_prodev.db"), "{message}");
}
