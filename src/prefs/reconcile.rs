//! Startup reconciliation between declared defaults and persisted values
//!
//! On every start [`Reconciler::run`] reads [`WRITE_DEFAULT`] and either
//! resets the store to the declared defaults or reconciles it:
//!
//! - keys already stored are compared against their default and reported
//!   when they differ, but never overwritten
//! - registered keys missing from the store get their default written
//! - stored keys nobody registered are removed, unless they start with the
//!   reserved prefix used by the dashboard

use super::registry::{PreferencesRegistry, WRITE_DEFAULT};
use super::store::PreferenceStore;
use super::types::{PrefDefinition, PrefValue};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Write a definition's default, whatever is currently stored
pub async fn write_default(store: &dyn PreferenceStore, def: &PrefDefinition) -> Result<()> {
    store
        .put(&def.key, def.default.clone())
        .await
        .with_context(|| format!("Failed to write default for '{}'", def.key))
}

/// Compare the current value against the default without touching storage
///
/// Doubles compare with exact equality.
pub async fn check_drift(store: &dyn PreferenceStore, def: &PrefDefinition) -> Result<Option<Notice>> {
    let key = def.key.as_str();
    let current = match &def.default {
        PrefValue::String(d) => {
            let v = store.get_string(key, d).await?;
            (v != *d).then_some(PrefValue::String(v))
        }
        PrefValue::Integer(d) => {
            let v = store.get_int(key, *d).await?;
            (v != *d).then_some(PrefValue::Integer(v))
        }
        PrefValue::Double(d) => {
            let v = store.get_double(key, *d).await?;
            (v != *d).then_some(PrefValue::Double(v))
        }
        PrefValue::Boolean(d) => {
            let v = store.get_boolean(key, *d).await?;
            (v != *d).then_some(PrefValue::Boolean(v))
        }
    };

    Ok(current.map(|value| Notice::NonDefault {
        key: def.key.clone(),
        value,
    }))
}

/// Operator-facing message produced during initialization
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A stored value differs from its declared default
    NonDefault { key: String, value: PrefValue },
    /// A stored key with no registered preference was deleted
    RemovedUnused { key: String },
}

impl Notice {
    pub fn key(&self) -> &str {
        match self {
            Notice::NonDefault { key, .. } | Notice::RemovedUnused { key } => key,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NonDefault { key, value } => {
                write!(f, "NON-DEFAULT PREFERENCE: {} = {}", key, value)
            }
            Notice::RemovedUnused { key } => write!(f, "REMOVING UNUSED KEY: {}", key),
        }
    }
}

/// Tuning knobs for [`Reconciler`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    /// Empty the store before writing defaults on reset
    pub clear_on_reset: bool,

    /// Remove stored keys that no registered preference owns
    pub prune_stale: bool,

    /// Keys with this prefix belong to the dashboard and are never pruned
    pub reserved_prefix: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            clear_on_reset: true,
            prune_stale: true,
            reserved_prefix: ".".to_string(),
        }
    }
}

/// Which path initialization took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMode {
    Reset,
    Reconcile,
}

/// Outcome of one initialization pass
#[derive(Debug, Clone, PartialEq)]
pub struct InitReport {
    pub mode: InitMode,

    /// Keys whose default was written during the pass
    pub seeded: Vec<String>,

    pub notices: Vec<Notice>,
}

impl InitReport {
    pub fn drifted(&self) -> impl Iterator<Item = &Notice> {
        self.notices
            .iter()
            .filter(|n| matches!(n, Notice::NonDefault { .. }))
    }

    pub fn removed(&self) -> impl Iterator<Item = &Notice> {
        self.notices
            .iter()
            .filter(|n| matches!(n, Notice::RemovedUnused { .. }))
    }
}

/// Runs the default-writer and drift-reporter passes over a registry
pub struct Reconciler<'a> {
    registry: &'a PreferencesRegistry,
    store: &'a dyn PreferenceStore,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        registry: &'a PreferencesRegistry,
        store: &'a dyn PreferenceStore,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            registry,
            store,
            options,
        }
    }

    /// Reset or reconcile, as selected by [`WRITE_DEFAULT`]
    pub async fn run(&self) -> Result<InitReport> {
        if WRITE_DEFAULT.get(self.store).await? {
            self.reset().await
        } else {
            self.reconcile().await
        }
    }

    /// Write every registered default
    pub async fn write_defaults(&self) -> Result<Vec<String>> {
        let mut written = Vec::new();
        for def in self.registry.list_all() {
            write_default(self.store, &def).await?;
            written.push(def.key);
        }
        Ok(written)
    }

    /// Report every registered value that differs from its default
    pub async fn report_drift(&self) -> Result<Vec<Notice>> {
        let mut notices = Vec::new();
        for def in self.registry.list_all() {
            if let Some(notice) = check_drift(self.store, &def).await? {
                notices.push(notice);
            }
        }
        Ok(notices)
    }

    /// Restore every default and arm reconciliation for the next start
    pub async fn reset(&self) -> Result<InitReport> {
        log::info!("Resetting {} preferences to defaults", self.registry.count());

        if self.options.clear_on_reset {
            self.store.remove_all().await?;
        }
        let seeded = self.write_defaults().await?;
        WRITE_DEFAULT.set(self.store, false).await?;

        Ok(InitReport {
            mode: InitMode::Reset,
            seeded,
            notices: Vec::new(),
        })
    }

    /// Report overrides, seed new keys and prune stale ones
    pub async fn reconcile(&self) -> Result<InitReport> {
        let mut seeded = Vec::new();
        let mut notices = Vec::new();
        let mut valid_keys = HashSet::new();

        for def in self.registry.list_all() {
            if self.store.contains_key(&def.key).await? {
                if let Some(notice) = check_drift(self.store, &def).await? {
                    log::warn!("{}", notice);
                    notices.push(notice);
                }
            } else {
                log::debug!("Seeding new preference {} = {}", def.key, def.default);
                write_default(self.store, &def).await?;
                seeded.push(def.key.clone());
            }
            valid_keys.insert(def.key);
        }

        if self.options.prune_stale {
            for key in self.store.keys().await? {
                if self.is_reserved(&key) || valid_keys.contains(&key) {
                    continue;
                }
                let notice = Notice::RemovedUnused { key };
                log::info!("{}", notice);
                self.store.remove(notice.key()).await?;
                notices.push(notice);
            }
        }

        Ok(InitReport {
            mode: InitMode::Reconcile,
            seeded,
            notices,
        })
    }

    fn is_reserved(&self, key: &str) -> bool {
        !self.options.reserved_prefix.is_empty() && key.starts_with(&self.options.reserved_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::store::MemoryStore;

    fn registry_with(defs: Vec<PrefDefinition>) -> PreferencesRegistry {
        let registry = PreferencesRegistry::new();
        registry.discover(defs);
        registry
    }

    fn notices_for<'r>(report: &'r InitReport, key: &str) -> Vec<&'r Notice> {
        report.notices.iter().filter(|n| n.key() == key).collect()
    }

    #[test]
    fn test_notice_format() {
        let drift = Notice::NonDefault {
            key: "x/P".to_string(),
            value: PrefValue::Double(0.2),
        };
        assert_eq!(drift.to_string(), "NON-DEFAULT PREFERENCE: x/P = 0.2");

        let removed = Notice::RemovedUnused {
            key: "Old/Key".to_string(),
        };
        assert_eq!(removed.to_string(), "REMOVING UNUSED KEY: Old/Key");
    }

    #[tokio::test]
    async fn test_check_drift_each_kind() {
        let store: MemoryStore = [
            ("s", PrefValue::from("b")),
            ("i", PrefValue::from(2)),
            ("d", PrefValue::from(0.5)),
            ("b", PrefValue::from(false)),
            ("same", PrefValue::from(1)),
        ]
        .into_iter()
        .collect();

        for def in [
            PrefDefinition::new("s", "a"),
            PrefDefinition::new("i", 1),
            PrefDefinition::new("d", 0.25),
            PrefDefinition::new("b", true),
        ] {
            let notice = check_drift(&store, &def).await.unwrap();
            assert!(notice.is_some(), "expected drift for {}", def.key);
        }

        let same = PrefDefinition::new("same", 1);
        assert_eq!(check_drift(&store, &same).await.unwrap(), None);

        let missing = PrefDefinition::new("missing", 1);
        assert_eq!(check_drift(&store, &missing).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_check_drift_uses_exact_float_equality() {
        let store: MemoryStore = [("x/P", 0.1 + 0.2)].into_iter().collect();
        let def = PrefDefinition::new("x/P", 0.3);

        assert!(check_drift(&store, &def).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_report_drift_does_not_mutate() {
        let store: MemoryStore = [("x/P", 0.2)].into_iter().collect();
        let registry = registry_with(vec![PrefDefinition::new("x/P", 0.081)]);
        let reconciler = Reconciler::new(&registry, &store, ReconcileOptions::default());

        let first = reconciler.report_drift().await.unwrap();
        let after_first = store.snapshot();
        let second = reconciler.report_drift().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(after_first, store.snapshot());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_first_run_resets() {
        let store: MemoryStore = [("junk", 1)].into_iter().collect();
        let registry = registry_with(vec![
            PrefDefinition::new("x/P", 0.081),
            PrefDefinition::new("x/Name", "drive"),
        ]);
        let reconciler = Reconciler::new(&registry, &store, ReconcileOptions::default());

        let report = reconciler.run().await.unwrap();

        assert_eq!(report.mode, InitMode::Reset);
        assert_eq!(report.seeded.len(), 3);
        assert!(report.notices.is_empty());
        assert!(!store.contains_key("junk").await.unwrap());
        assert_eq!(store.get_double("x/P", 0.0).await.unwrap(), 0.081);
        assert!(!WRITE_DEFAULT.get(&store).await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_without_clear_keeps_foreign_keys() {
        let store: MemoryStore = [("junk", 1)].into_iter().collect();
        let registry = registry_with(vec![PrefDefinition::new("x/P", 0.081)]);
        let options = ReconcileOptions {
            clear_on_reset: false,
            ..ReconcileOptions::default()
        };

        let report = Reconciler::new(&registry, &store, options).reset().await.unwrap();

        assert_eq!(report.mode, InitMode::Reset);
        assert!(store.contains_key("junk").await.unwrap());
        assert_eq!(store.get_double("x/P", 0.0).await.unwrap(), 0.081);
    }

    #[tokio::test]
    async fn test_reconcile_seeds_missing_key_without_notice() {
        let store: MemoryStore = [("WriteDefaultPrefs", false)].into_iter().collect();
        let registry = registry_with(vec![PrefDefinition::new("x/P", 0.081)]);
        let reconciler = Reconciler::new(&registry, &store, ReconcileOptions::default());

        let report = reconciler.run().await.unwrap();

        assert_eq!(report.mode, InitMode::Reconcile);
        assert_eq!(report.seeded, vec!["x/P"]);
        assert!(notices_for(&report, "x/P").is_empty());
        assert_eq!(store.get("x/P").await.unwrap(), Some(PrefValue::Double(0.081)));
    }

    #[tokio::test]
    async fn test_reconcile_preserves_override_and_reports_once() {
        let store: MemoryStore = [
            ("WriteDefaultPrefs", PrefValue::from(false)),
            ("x/P", PrefValue::from(0.2)),
        ]
        .into_iter()
        .collect();
        let registry = registry_with(vec![PrefDefinition::new("x/P", 0.081)]);
        let reconciler = Reconciler::new(&registry, &store, ReconcileOptions::default());

        let report = reconciler.run().await.unwrap();

        assert_eq!(
            notices_for(&report, "x/P"),
            vec![&Notice::NonDefault {
                key: "x/P".to_string(),
                value: PrefValue::Double(0.2),
            }]
        );
        assert!(report.seeded.is_empty());
        assert_eq!(store.get_double("x/P", 0.0).await.unwrap(), 0.2);

        // A second pass reports the same override again, exactly once
        let again = reconciler.run().await.unwrap();
        assert_eq!(notices_for(&again, "x/P").len(), 1);
        assert_eq!(store.get_double("x/P", 0.0).await.unwrap(), 0.2);
    }

    #[tokio::test]
    async fn test_reconcile_prunes_stale_but_not_reserved() {
        let store: MemoryStore = [
            ("WriteDefaultPrefs", PrefValue::from(false)),
            ("Old/Gain", PrefValue::from(1.5)),
            (".type", PrefValue::from("RobotPreferences")),
            ("x/P", PrefValue::from(0.081)),
        ]
        .into_iter()
        .collect();
        let registry = registry_with(vec![PrefDefinition::new("x/P", 0.081)]);
        let reconciler = Reconciler::new(&registry, &store, ReconcileOptions::default());

        let report = reconciler.run().await.unwrap();

        let removed: Vec<_> = report.removed().map(|n| n.key()).collect();
        assert_eq!(removed, vec!["Old/Gain"]);
        assert!(!store.contains_key("Old/Gain").await.unwrap());
        assert!(store.contains_key(".type").await.unwrap());
        assert!(store.contains_key("x/P").await.unwrap());
    }

    #[tokio::test]
    async fn test_reconcile_without_pruning() {
        let store: MemoryStore = [
            ("WriteDefaultPrefs", PrefValue::from(false)),
            ("Old/Gain", PrefValue::from(1.5)),
        ]
        .into_iter()
        .collect();
        let registry = registry_with(vec![]);
        let options = ReconcileOptions {
            prune_stale: false,
            ..ReconcileOptions::default()
        };

        let report = Reconciler::new(&registry, &store, options).run().await.unwrap();

        assert_eq!(report.removed().count(), 0);
        assert!(store.contains_key("Old/Gain").await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_then_reconcile_is_quiet() {
        let store = MemoryStore::new();
        let registry = registry_with(vec![
            PrefDefinition::new("DriveStraight/P", 0.081),
            PrefDefinition::new("DriveManually/UsingTankControl", true),
        ]);
        let reconciler = Reconciler::new(&registry, &store, ReconcileOptions::default());

        assert_eq!(reconciler.run().await.unwrap().mode, InitMode::Reset);
        for def in registry.list_all() {
            let stored = store.get(&def.key).await.unwrap();
            if def.key == WRITE_DEFAULT.key() {
                assert_eq!(stored, Some(PrefValue::Boolean(false)));
            } else {
                assert_eq!(stored, Some(def.default));
            }
        }

        // WriteDefaultPrefs now differs from its default, and that is all
        let report = reconciler.run().await.unwrap();
        assert_eq!(report.mode, InitMode::Reconcile);
        let drifted: Vec<_> = report.drifted().map(|n| n.key()).collect();
        assert_eq!(drifted, vec!["WriteDefaultPrefs"]);
        assert!(report.seeded.is_empty());
    }
}
