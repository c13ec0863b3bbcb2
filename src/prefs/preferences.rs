//! Registry-aware access to stored preferences

use super::reconcile::{InitMode, InitReport, ReconcileOptions, Reconciler};
use super::registry::{PreferencesRegistry, WRITE_DEFAULT};
use super::store::PreferenceStore;
use super::types::{PrefDefinition, PrefValue};
use anyhow::Result;
use std::sync::{Arc, Mutex, PoisonError};

/// Lifecycle of the startup routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Resetting,
    Reconciling,
    Ready(InitMode),
}

/// A registered preference alongside what is currently stored for it
#[derive(Debug, Clone, PartialEq)]
pub struct PrefEntry {
    pub definition: PrefDefinition,
    pub current: PrefValue,
    pub is_default: bool,
}

/// Store plus registry, with type validation on every keyed access
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
    registry: Arc<PreferencesRegistry>,
    state: Mutex<InitState>,
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>, registry: Arc<PreferencesRegistry>) -> Self {
        Self {
            store,
            registry,
            state: Mutex::new(InitState::Uninitialized),
        }
    }

    pub fn registry(&self) -> &PreferencesRegistry {
        &self.registry
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        self.store.as_ref()
    }

    pub fn state(&self) -> InitState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run startup reset or reconciliation; only the first call does work
    pub async fn init(&self, options: ReconcileOptions) -> Result<InitReport> {
        if self.state() != InitState::Uninitialized {
            anyhow::bail!("Preferences are already initialized ({:?})", self.state());
        }

        let reconciler = Reconciler::new(&self.registry, self.store.as_ref(), options);
        let resetting = WRITE_DEFAULT.get(self.store.as_ref()).await?;

        let result = if resetting {
            self.set_state(InitState::Resetting);
            reconciler.reset().await
        } else {
            self.set_state(InitState::Reconciling);
            reconciler.reconcile().await
        };

        match result {
            Ok(report) => {
                log::info!(
                    "Preferences ready ({:?}): {} seeded, {} notices",
                    report.mode,
                    report.seeded.len(),
                    report.notices.len()
                );
                self.set_state(InitState::Ready(report.mode));
                Ok(report)
            }
            Err(e) => {
                self.set_state(InitState::Uninitialized);
                Err(e)
            }
        }
    }

    /// Current value of a registered preference, or its default
    pub async fn get(&self, key: &str) -> Result<PrefValue> {
        let def = self.definition(key)?;
        self.current(&def).await
    }

    /// Store a value for a registered preference of the same kind
    pub async fn set(&self, key: &str, value: PrefValue) -> Result<()> {
        let def = self.definition(key)?;
        def.validate(&value)?;
        self.store.put(key, value).await
    }

    /// Parse text as the registered kind, then store it
    pub async fn set_raw(&self, key: &str, raw: &str) -> Result<PrefValue> {
        let def = self.definition(key)?;
        let value = def.kind().parse(raw)?;
        self.store.put(key, value.clone()).await?;
        Ok(value)
    }

    /// Restore one preference to its default
    pub async fn reset(&self, key: &str) -> Result<PrefValue> {
        let def = self.definition(key)?;
        self.store.put(key, def.default.clone()).await?;
        Ok(def.default)
    }

    /// Make the next [`Preferences::init`] reset every preference
    pub async fn request_reset(&self) -> Result<()> {
        WRITE_DEFAULT.set(self.store.as_ref(), true).await
    }

    /// Every registered preference with its current value, sorted by key
    pub async fn entries(&self) -> Result<Vec<PrefEntry>> {
        self.collect(self.registry.list_all()).await
    }

    pub async fn namespace_entries(&self, namespace: &str) -> Result<Vec<PrefEntry>> {
        self.collect(self.registry.list_namespace(namespace)).await
    }

    async fn collect(&self, defs: Vec<PrefDefinition>) -> Result<Vec<PrefEntry>> {
        let mut entries = Vec::with_capacity(defs.len());
        for definition in defs {
            let current = self.current(&definition).await?;
            let is_default = current == definition.default;
            entries.push(PrefEntry {
                definition,
                current,
                is_default,
            });
        }
        Ok(entries)
    }

    async fn current(&self, def: &PrefDefinition) -> Result<PrefValue> {
        match self.store.get(&def.key).await? {
            Some(value) if value.kind() == def.kind() => Ok(value),
            _ => Ok(def.default.clone()),
        }
    }

    fn definition(&self, key: &str) -> Result<PrefDefinition> {
        self.registry
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("Preference '{}' is not registered", key))
    }

    fn set_state(&self, state: InitState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}
