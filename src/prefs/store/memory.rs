//! In-process store, lost on exit

use super::PreferenceStore;
use crate::prefs::types::PrefValue;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, PrefValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored entry, for assertions and export
    pub fn snapshot(&self) -> BTreeMap<String, PrefValue> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<K: Into<String>, V: Into<PrefValue>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<PrefValue>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: PrefValue) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.keys().cloned().collect())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }

    async fn remove_all(&self) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_typed_getters_fall_back_to_default() {
        let store = MemoryStore::new();

        assert_eq!(store.get_double("DriveStraight/P", 0.081).await.unwrap(), 0.081);
        assert_eq!(store.get_int("missing", 7).await.unwrap(), 7);
        assert_eq!(store.get_string("missing", "dflt").await.unwrap(), "dflt");
        assert!(store.get_boolean("missing", true).await.unwrap());
        assert!(!store.contains_key("DriveStraight/P").await.unwrap());
    }

    #[tokio::test]
    async fn test_kind_mismatch_returns_default() {
        let store: MemoryStore = [("x", 3)].into_iter().collect();

        // Stored as an integer, read as a double
        assert_eq!(store.get_double("x", 0.5).await.unwrap(), 0.5);
        assert_eq!(store.get_int("x", 0).await.unwrap(), 3);
        assert!(store.contains_key("x").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_remove_and_keys() {
        let store = MemoryStore::new();
        store.put_double("b/P", 0.2).await.unwrap();
        store.put_string("a/name", "left").await.unwrap();
        store.put_boolean(".type", true).await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec![".type", "a/name", "b/P"]);

        store.remove("a/name").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec![".type", "b/P"]);

        // Removing an absent key is a no-op
        store.remove("a/name").await.unwrap();

        store.remove_all().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }
}
