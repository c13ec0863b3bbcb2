use crate::config::Config;
use crate::prefs::transfer;
use anyhow::Result;
use colored::*;
use log::info;
use std::path::Path;

pub async fn export_command(config: &Config, path: &Path) -> Result<()> {
    info!("Exporting preferences to {:?}", path);

    let count = transfer::export_to_file(config.preferences.store(), path).await?;
    println!("{} Exported {} preferences to {}", "✓".bright_green().bold(), count, path.display());

    Ok(())
}

pub async fn import_command(config: &Config, path: &Path) -> Result<()> {
    info!("Importing preferences from {:?}", path);

    let preferences = &config.preferences;
    let summary = transfer::import_from_file(preferences.store(), preferences.registry(), path).await?;

    for (key, reason) in &summary.skipped {
        println!("  {} {}: {}", "skipped".yellow(), key, reason);
    }
    println!(
        "{} Imported {} preferences from {}",
        "✓".bright_green().bold(),
        summary.imported.len(),
        path.display()
    );

    Ok(())
}
