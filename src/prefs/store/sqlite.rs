//! Database-backed preference storage

use super::PreferenceStore;
use crate::prefs::types::{PrefKind, PrefValue};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Stores each preference as a `(kind, text)` row in the `preferences` table
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a store over an already migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Decode a row, treating unreadable rows as absent so the default applies
    fn decode(key: &str, kind: &str, raw: &str) -> Option<PrefValue> {
        let Some(kind) = PrefKind::from_name(kind) else {
            log::warn!("Ignoring preference '{}' with unknown kind '{}'", key, kind);
            return None;
        };
        match kind.parse(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring unreadable preference '{}': {:#}", key, e);
                None
            }
        }
    }
}

#[async_trait]
impl PreferenceStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<PrefValue>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT kind, value FROM preferences WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to get preference from database")?;

        Ok(row.and_then(|(kind, raw)| Self::decode(key, &kind, &raw)))
    }

    async fn put(&self, key: &str, value: PrefValue) -> Result<()> {
        let kind = value.kind().as_str();
        let raw = value.to_string();

        sqlx::query(
            "INSERT INTO preferences (key, kind, value, updated_at) VALUES (?, ?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET kind = excluded.kind, value = excluded.value, updated_at = CURRENT_TIMESTAMP"
        )
        .bind(key)
        .bind(kind)
        .bind(&raw)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to store preference '{}'", key))?;

        log::debug!("Set preference: {} = {} ({})", key, raw, kind);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT key FROM preferences ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list preference keys")
    }

    async fn contains_key(&self, key: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check preference key")?;
        Ok(count > 0)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete preference '{}'", key))?;
        Ok(())
    }

    async fn remove_all(&self) -> Result<()> {
        let result = sqlx::query("DELETE FROM preferences")
            .execute(&self.pool)
            .await
            .context("Failed to clear preferences")?;
        log::debug!("Removed {} preferences", result.rows_affected());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::db;

    async fn setup_test_store() -> SqliteStore {
        let pool = db::connect_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn test_roundtrip_each_kind() {
        let store = setup_test_store().await;

        store.put_string("Vision/Camera", "front").await.unwrap();
        store.put_int("Auto/Delay", -2).await.unwrap();
        store.put_double("DriveStraight/I", 0.00016).await.unwrap();
        store.put_boolean("DriveManually/UsingTankControl", false).await.unwrap();

        assert_eq!(store.get_string("Vision/Camera", "").await.unwrap(), "front");
        assert_eq!(store.get_int("Auto/Delay", 0).await.unwrap(), -2);
        assert_eq!(store.get_double("DriveStraight/I", 0.0).await.unwrap(), 0.00016);
        assert!(!store.get_boolean("DriveManually/UsingTankControl", true).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_replaces_kind() {
        let store = setup_test_store().await;

        store.put_int("x", 1).await.unwrap();
        store.put_double("x", 1.5).await.unwrap();

        assert_eq!(store.get("x").await.unwrap(), Some(PrefValue::Double(1.5)));
        assert_eq!(store.keys().await.unwrap(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_unreadable_row_is_absent() {
        let store = setup_test_store().await;

        sqlx::query("INSERT INTO preferences (key, kind, value) VALUES ('bad', 'double', 'fast')")
            .execute(store.pool())
            .await
            .unwrap();

        assert_eq!(store.get("bad").await.unwrap(), None);
        assert_eq!(store.get_double("bad", 0.5).await.unwrap(), 0.5);
        // The row still exists, so pruning and listing still see it
        assert!(store.contains_key("bad").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_and_remove_all() {
        let store = setup_test_store().await;

        store.put_boolean("a", true).await.unwrap();
        store.put_boolean("b", true).await.unwrap();
        store.remove("a").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["b"]);

        store.remove_all().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }
}
