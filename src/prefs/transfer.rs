//! TOML export/import of stored preferences
//!
//! The document is one flat table of quoted keys:
//!
//! ```toml
//! "DriveStraight/P" = 0.081
//! "DriveManually/UsingTankControl" = true
//! ```

use super::registry::PreferencesRegistry;
use super::store::PreferenceStore;
use super::types::{PrefKind, PrefValue};
use anyhow::{Context, Result};
use std::path::Path;

/// What an import did
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportSummary {
    pub imported: Vec<String>,
    pub skipped: Vec<(String, String)>,
}

/// Render every stored preference as a TOML document
pub async fn export_toml(store: &dyn PreferenceStore) -> Result<String> {
    let mut table = toml::Table::new();
    for key in store.keys().await? {
        if let Some(value) = store.get(&key).await? {
            table.insert(key, to_toml(value));
        }
    }
    toml::to_string_pretty(&table).context("Failed to serialize preferences to TOML")
}

pub async fn export_to_file(store: &dyn PreferenceStore, path: &Path) -> Result<usize> {
    log::info!("Exporting preferences to TOML: {:?}", path);
    let content = export_toml(store).await?;
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write TOML file: {:?}", path))?;
    Ok(store.keys().await?.len())
}

/// Store every entry of a TOML document
///
/// Registered keys must match their declared kind (integers are accepted
/// for doubles). Unregistered keys are stored as-is and left for
/// reconciliation to prune.
pub async fn import_toml(
    store: &dyn PreferenceStore,
    registry: &PreferencesRegistry,
    content: &str,
) -> Result<ImportSummary> {
    let table: toml::Table = toml::from_str(content).context("Failed to parse preferences TOML")?;
    let mut summary = ImportSummary::default();

    for (key, item) in table {
        let value = match from_toml(item) {
            Ok(value) => value,
            Err(reason) => {
                log::warn!("Skipping imported preference '{}': {}", key, reason);
                summary.skipped.push((key, reason));
                continue;
            }
        };

        let value = match registry.get(&key) {
            Some(def) => match (def.default.kind(), value) {
                (kind, value) if kind == value.kind() => value,
                (PrefKind::Double, PrefValue::Integer(v)) => PrefValue::Double(v.into()),
                (kind, value) => {
                    let reason = format!("expected {}, got {}", kind, value.kind());
                    log::warn!("Skipping imported preference '{}': {}", key, reason);
                    summary.skipped.push((key, reason));
                    continue;
                }
            },
            None => value,
        };

        store.put(&key, value).await?;
        summary.imported.push(key);
    }

    Ok(summary)
}

pub async fn import_from_file(
    store: &dyn PreferenceStore,
    registry: &PreferencesRegistry,
    path: &Path,
) -> Result<ImportSummary> {
    log::info!("Importing preferences from TOML: {:?}", path);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read TOML file: {:?}", path))?;
    import_toml(store, registry, &content).await
}

fn to_toml(value: PrefValue) -> toml::Value {
    match value {
        PrefValue::String(v) => toml::Value::String(v),
        PrefValue::Integer(v) => toml::Value::Integer(v.into()),
        PrefValue::Double(v) => toml::Value::Float(v),
        PrefValue::Boolean(v) => toml::Value::Boolean(v),
    }
}

fn from_toml(item: toml::Value) -> std::result::Result<PrefValue, String> {
    match item {
        toml::Value::String(v) => Ok(PrefValue::String(v)),
        toml::Value::Integer(v) => i32::try_from(v)
            .map(PrefValue::Integer)
            .map_err(|_| format!("integer {} is out of range", v)),
        toml::Value::Float(v) => Ok(PrefValue::Double(v)),
        toml::Value::Boolean(v) => Ok(PrefValue::Boolean(v)),
        other => Err(format!("unsupported {} value", other.type_str())),
    }
}
