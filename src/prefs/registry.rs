//! Registration table of every preference the application declares

use super::types::PrefDefinition;
use super::value::{BooleanValue, PrefType, TypedValue};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Selects reset or reconcile on the next start. Cleared after a reset.
pub const WRITE_DEFAULT: BooleanValue = BooleanValue::new("WriteDefaultPrefs", true)
    .described("Reset every preference to its default on the next start");

/// Registry of preference definitions, keyed and ordered by key
pub struct PreferencesRegistry {
    definitions: RwLock<BTreeMap<String, PrefDefinition>>,
}

impl PreferencesRegistry {
    /// Create a registry holding only [`WRITE_DEFAULT`]
    pub fn new() -> Self {
        let mut definitions = BTreeMap::new();
        let write_default = WRITE_DEFAULT.definition();
        definitions.insert(write_default.key.clone(), write_default);

        Self {
            definitions: RwLock::new(definitions),
        }
    }

    /// Register a new preference definition
    ///
    /// Returns an error if the key is empty or already registered
    pub fn register(&self, def: PrefDefinition) -> Result<()> {
        if def.key.trim().is_empty() {
            anyhow::bail!("Preference key must not be empty");
        }

        let mut defs = self.definitions.write().unwrap_or_else(PoisonError::into_inner);
        if defs.contains_key(&def.key) {
            anyhow::bail!("Preference '{}' is already registered", def.key);
        }
        log::debug!("Registered preference: {} = {} ({})", def.key, def.default, def.kind());
        defs.insert(def.key.clone(), def);
        Ok(())
    }

    pub fn register_value<T: PrefType>(&self, value: &TypedValue<T>) -> Result<()> {
        self.register(value.definition())
    }

    /// Register every definition, logging and skipping the ones that fail
    ///
    /// Returns how many were registered.
    pub fn discover<I>(&self, defs: I) -> usize
    where
        I: IntoIterator<Item = PrefDefinition>,
    {
        let mut registered = 0;
        for def in defs {
            let key = def.key.clone();
            match self.register(def) {
                Ok(()) => registered += 1,
                Err(e) => log::error!("Skipping preference '{}': {:#}", key, e),
            }
        }
        registered
    }

    pub fn get(&self, key: &str) -> Option<PrefDefinition> {
        self.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// All definitions, sorted by key
    pub fn list_all(&self) -> Vec<PrefDefinition> {
        self.read().values().cloned().collect()
    }

    /// All definitions whose first key segment is `namespace`
    pub fn list_namespace(&self, namespace: &str) -> Vec<PrefDefinition> {
        self.read()
            .values()
            .filter(|def| def.namespace() == namespace)
            .cloned()
            .collect()
    }

    /// Unique first key segments, sorted
    pub fn namespaces(&self) -> Vec<String> {
        let mut namespaces: Vec<_> = self
            .read()
            .values()
            .map(|def| def.namespace().to_string())
            .collect();
        namespaces.sort();
        namespaces.dedup();
        namespaces
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, PrefDefinition>> {
        self.definitions.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PreferencesRegistry {
    fn default() -> Self {
        Self::new()
    }
}
