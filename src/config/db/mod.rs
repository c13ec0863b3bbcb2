//! Database connection and schema management

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

/// Connect to SQLite database with proper configuration
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let pool = SqlitePool::connect(&database_url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", db_path.display()))?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await
        .context("Failed to enable WAL mode")?;

    // Preferences must survive a brownout mid-write
    sqlx::query("PRAGMA synchronous = FULL")
        .execute(&pool)
        .await
        .context("Failed to set synchronous mode")?;

    sqlx::query("PRAGMA temp_store = MEMORY")
        .execute(&pool)
        .await
        .context("Failed to set temp store")?;

    log::debug!("Connected to SQLite database: {}", db_path.display());
    Ok(pool)
}

/// Connect to in-memory database for testing
///
/// A single connection keeps every query on the same in-memory database.
pub async fn connect_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .context("Failed to connect to in-memory database")?;

    log::debug!("Connected to in-memory SQLite database");
    Ok(pool)
}

/// Bring the schema up to date
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    log::debug!("Running database migrations");

    let migration_manager = crate::config::migrations::MigrationManager::new(pool);
    migration_manager.migrate_up().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_database_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");

        let pool = connect(&path).await.unwrap();
        run_migrations(&pool).await.unwrap();
        sqlx::query("INSERT INTO preferences (key, kind, value) VALUES ('k', 'integer', '5')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let pool = connect(&path).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let value: String = sqlx::query_scalar("SELECT value FROM preferences WHERE key = 'k'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(value, "5");
    }
}
