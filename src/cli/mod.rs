//! Command-line interface over the preferences store

pub mod app;
pub mod commands;

pub use app::{Cli, Commands, GlobalArgs};

use crate::config::{self, Config, Settings};
use anyhow::Result;

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config = open(&cli.global).await?;

    match cli.command {
        Commands::Init => commands::init::init_command(&config).await,
        Commands::Show { namespace } => commands::show::show_command(&config, namespace).await,
        Commands::Keys => commands::show::keys_command(&config).await,
        Commands::Get { key } => commands::edit::get_command(&config, &key).await,
        Commands::Set { key, value } => commands::edit::set_command(&config, &key, &value).await,
        Commands::Reset { key } => commands::edit::reset_command(&config, &key).await,
        Commands::ResetAll { force } => commands::edit::reset_all_command(&config, force).await,
        Commands::Export { path } => commands::transfer::export_command(&config, &path).await,
        Commands::Import { path } => commands::transfer::import_command(&config, &path).await,
    }
}

/// Resolve settings (file, then environment, then flags) and open the store
pub async fn open(global: &GlobalArgs) -> Result<Config> {
    let settings_path = match &global.config {
        Some(path) => path.clone(),
        None => config::settings_path()?,
    };
    let mut settings = Settings::load_from(&settings_path)?.apply_env();
    if let Some(db) = &global.db {
        settings.database_path = Some(db.clone());
    }

    if global.memory {
        log::info!("Using in-memory preferences store");
        Ok(Config::in_memory(settings))
    } else {
        Config::load(settings).await
    }
}
