//! Configuration for robot-prefs
//!
//! Two layers:
//! - `settings.toml` describes where preferences live and how startup
//!   reconciliation behaves
//! - the SQLite database holds the preferences themselves

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod db;
pub mod migrations;

use crate::prefs::{
    MemoryStore, PreferenceStore, Preferences, PreferencesRegistry, ReconcileOptions, SqliteStore,
};

/// Environment variable overriding the database location
pub const DB_ENV: &str = "ROBOT_PREFS_DB";

/// Environment variable overriding the settings file location
pub const CONFIG_ENV: &str = "ROBOT_PREFS_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Preferences database; defaults to `preferences.db` in the config directory
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub reconcile: ReconcileOptions,
}

impl Settings {
    /// Load settings from `path`, falling back to defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("Settings file {:?} doesn't exist, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))?;

        log::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings file: {:?}", path))?;
        log::info!("Settings saved to {:?}", path);
        Ok(())
    }

    /// Apply environment overrides such as [`DB_ENV`]
    pub fn apply_env(mut self) -> Self {
        if let Ok(path) = std::env::var(DB_ENV) {
            log::debug!("Using database from {}: {}", DB_ENV, path);
            self.database_path = Some(PathBuf::from(path));
        }
        self
    }

    pub fn resolve_database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join("preferences.db")),
        }
    }
}

/// Get the robot-prefs configuration directory, creating it on demand
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = if cfg!(target_os = "linux") {
        dirs::config_dir()
            .context("Failed to get XDG config directory")?
            .join("robot-prefs")
    } else {
        dirs::home_dir()
            .context("Failed to get home directory")?
            .join(".robot-prefs")
    };

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
        log::info!("Created config directory: {:?}", config_dir);
    }

    Ok(config_dir)
}

/// Settings file path, honouring [`CONFIG_ENV`]
pub fn settings_path() -> Result<PathBuf> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => Ok(PathBuf::from(path)),
        Err(_) => Ok(config_dir()?.join("settings.toml")),
    }
}

/// Loaded settings plus a ready-to-use preferences handle
pub struct Config {
    pub settings: Settings,
    pub preferences: Preferences,
}

impl Config {
    /// Open the configured database and register every robot preference
    pub async fn load(settings: Settings) -> Result<Self> {
        let db_path = settings.resolve_database_path()?;
        log::debug!("Loading preferences from: {:?}", db_path);

        let pool = db::connect(&db_path).await?;
        db::run_migrations(&pool).await?;

        Ok(Self::with_store(settings, Arc::new(SqliteStore::new(pool))))
    }

    /// Preferences held in memory only, discarded on exit
    pub fn in_memory(settings: Settings) -> Self {
        Self::with_store(settings, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(settings: Settings, store: Arc<dyn PreferenceStore>) -> Self {
        let registry = PreferencesRegistry::new();
        let count = crate::prefs::registrations::register_all(&registry);
        log::debug!("Initialized preferences registry with {} entries", count + 1);

        Self {
            settings,
            preferences: Preferences::new(store, Arc::new(registry)),
        }
    }

    /// Run startup reconciliation with the configured options
    pub async fn init(&self) -> Result<crate::prefs::InitReport> {
        self.preferences.init(self.settings.reconcile.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.toml")).unwrap();

        assert_eq!(settings, Settings::default());
        assert!(settings.reconcile.prune_stale);
        assert_eq!(settings.reconcile.reserved_prefix, ".");
    }

    #[test]
    fn test_partial_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "database_path = \"/tmp/robot.db\"\n\n[reconcile]\nprune_stale = false\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.database_path, Some(PathBuf::from("/tmp/robot.db")));
        assert!(!settings.reconcile.prune_stale);
        assert!(settings.reconcile.clear_on_reset);
        assert_eq!(settings.reconcile.reserved_prefix, ".");
    }

    #[test]
    fn test_settings_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let settings = Settings {
            database_path: Some(dir.path().join("prefs.db")),
            reconcile: ReconcileOptions {
                clear_on_reset: false,
                prune_stale: true,
                reserved_prefix: "__".to_string(),
            },
        };

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_settings_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[reconcile]\nprune_stale = \"sometimes\"\n").unwrap();

        assert!(Settings::load_from(&path).is_err());
    }

    #[tokio::test]
    async fn test_in_memory_config_registers_robot_preferences() {
        let config = Config::in_memory(Settings::default());
        assert_eq!(config.preferences.registry().count(), 7);

        let report = config.init().await.unwrap();
        assert_eq!(report.mode, crate::prefs::InitMode::Reset);
    }
}
