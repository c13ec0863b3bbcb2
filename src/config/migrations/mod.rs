//! Versioned schema migrations for the preferences database

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashSet};

pub mod manager;

pub use manager::MigrationManager;

/// A single forward migration
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub sql: String,
}

/// Migration status in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub applied_at: chrono::DateTime<chrono::Utc>,
    pub checksum: String,
}

/// Load all available migrations from the embedded files
pub fn load_migrations() -> BTreeMap<i64, Migration> {
    let mut migrations = BTreeMap::new();

    migrations.insert(1, Migration {
        version: 1,
        name: "preferences".to_string(),
        sql: include_str!("files/001_preferences.sql").to_string(),
    });

    migrations
}

/// Initialize the migration tracking table
pub async fn init_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            checksum TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    Ok(())
}

/// Get list of applied migrations
pub async fn get_applied_migrations(pool: &SqlitePool) -> Result<Vec<AppliedMigration>> {
    sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, name, applied_at, checksum FROM schema_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .context("Failed to get applied migrations")
}

/// Calculate checksum for migration SQL, stable across toolchains
pub fn calculate_checksum(sql: &str) -> String {
    use sha2::{Digest, Sha256};

    format!("{:x}", Sha256::digest(sql.as_bytes()))
}

/// Validate that applied migrations match available ones
pub async fn validate_migrations(pool: &SqlitePool) -> Result<()> {
    let available = load_migrations();

    for applied in get_applied_migrations(pool).await? {
        let Some(migration) = available.get(&applied.version) else {
            anyhow::bail!(
                "Applied migration {} '{}' not found in available migrations. \
                The database was created by a newer version of robot-prefs.",
                applied.version,
                applied.name
            );
        };

        let expected = calculate_checksum(&migration.sql);
        if applied.checksum != expected {
            anyhow::bail!(
                "Migration {} checksum mismatch! Applied: {}, Expected: {}",
                applied.version,
                applied.checksum,
                expected
            );
        }
    }

    Ok(())
}

/// Get pending migrations (available but not applied), oldest first
pub async fn get_pending_migrations(pool: &SqlitePool) -> Result<Vec<Migration>> {
    let applied: HashSet<i64> = get_applied_migrations(pool)
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    Ok(load_migrations()
        .into_values()
        .filter(|m| !applied.contains(&m.version))
        .collect())
}
