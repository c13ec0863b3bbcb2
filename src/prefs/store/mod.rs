//! Persistent key/value storage behind the preferences system
//!
//! Backends only have to move [`PrefValue`]s in and out by key. The typed
//! getters fall back to the caller's default when a key is missing or holds
//! a different kind, so a first boot against an empty store is not an error.

use super::types::PrefValue;
use anyhow::Result;
use async_trait::async_trait;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Raw stored value, `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<PrefValue>>;

    /// Insert or replace the value stored under `key`
    async fn put(&self, key: &str, value: PrefValue) -> Result<()>;

    /// Every key currently in storage, sorted
    async fn keys(&self) -> Result<Vec<String>>;

    async fn remove(&self, key: &str) -> Result<()>;

    async fn remove_all(&self) -> Result<()>;

    async fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn get_string(&self, key: &str, default: &str) -> Result<String> {
        match self.get(key).await? {
            Some(PrefValue::String(v)) => Ok(v),
            _ => Ok(default.to_string()),
        }
    }

    async fn get_int(&self, key: &str, default: i32) -> Result<i32> {
        match self.get(key).await? {
            Some(PrefValue::Integer(v)) => Ok(v),
            _ => Ok(default),
        }
    }

    async fn get_double(&self, key: &str, default: f64) -> Result<f64> {
        match self.get(key).await? {
            Some(PrefValue::Double(v)) => Ok(v),
            _ => Ok(default),
        }
    }

    async fn get_boolean(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key).await? {
            Some(PrefValue::Boolean(v)) => Ok(v),
            _ => Ok(default),
        }
    }

    async fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.put(key, PrefValue::String(value.to_string())).await
    }

    async fn put_int(&self, key: &str, value: i32) -> Result<()> {
        self.put(key, PrefValue::Integer(value)).await
    }

    async fn put_double(&self, key: &str, value: f64) -> Result<()> {
        self.put(key, PrefValue::Double(value)).await
    }

    async fn put_boolean(&self, key: &str, value: bool) -> Result<()> {
        self.put(key, PrefValue::Boolean(value)).await
    }
}
