//! Shared test utilities for database operations
//!
//! `test_pool()` gives each test its own in-memory database with the
//! production schema applied. `file_pool()` is for tests that need real
//! writer serialization across connections.

use sqlx::SqlitePool;
use tempfile::TempDir;

use super::Database;

/// Create an in-memory test database pool with full schema
pub async fn test_pool() -> SqlitePool {
    let db = Database::new(None)
        .await
        .expect("Failed to create test database");
    db.pool().clone()
}

/// Create an on-disk test database inside a temp directory
///
/// The returned `TempDir` must be kept alive for as long as the pool is used.
pub async fn file_pool() -> (SqlitePool, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("test.db");
    let db = Database::new(Some(&path.to_string_lossy()))
        .await
        .expect("Failed to create test database");
    (db.pool().clone(), dir)
}
