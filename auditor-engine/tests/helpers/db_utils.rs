//! Database Test Utilities

use auditor_common::db::init_schema;
use auditor_engine::persistence::SqliteAuditStore;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

/// In-memory store with the schema applied
///
/// Single connection: each in-memory connection is its own database.
pub async fn create_memory_store() -> SqliteAuditStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    SqliteAuditStore::new(pool).await.unwrap()
}

/// File-backed store in a temporary directory
///
/// Returns (TempDir, store) - TempDir must be kept alive for duration of test
pub async fn create_file_store() -> (TempDir, SqliteAuditStore) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = auditor_common::config::database_path(temp_dir.path());
    let store = SqliteAuditStore::open(&db_path).await.unwrap();
    (temp_dir, store)
}
