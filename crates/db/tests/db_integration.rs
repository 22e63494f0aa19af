//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `roboclub_test`)
//!   `TEST_DB_PASSWORD` (default: `roboclub_test`)
//!   `TEST_DB_NAME` (default: `roboclub_test`)

#![allow(clippy::unwrap_used)]

use roboclub_db::test_utils::{TestDatabase, TestDbConfig};

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_cleanup() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_bring_up_schema() {
    let db = TestDatabase::create_unique()
        .await
        .expect("Failed to create test database");

    use sea_orm::ConnectionTrait;
    for table in [
        "member_profile",
        "lab_component",
        "lab_access_request",
        "lab_request_item",
    ] {
        let result = db
            .connection()
            .execute(sea_orm::Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                format!("SELECT 1 FROM \"{table}\" LIMIT 1"),
            ))
            .await;
        assert!(result.is_ok(), "Table {table} missing: {:?}", result.err());
    }

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_quantity_checks_enforced() {
    let db = TestDatabase::create_unique()
        .await
        .expect("Failed to create test database");

    use sea_orm::ConnectionTrait;
    // available_quantity must stay within [0, total_quantity]
    let result = db
        .connection()
        .execute(sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "INSERT INTO lab_component \
             (id, name, total_quantity, available_quantity, created_by, created_at) \
             VALUES ('c_bad', 'Bad', 2, 5, 'admin1', now())"
                .to_string(),
        ))
        .await;
    assert!(result.is_err(), "Check constraint should reject available > total");

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
