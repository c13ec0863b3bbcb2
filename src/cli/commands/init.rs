use crate::config::Config;
use crate::prefs::{InitMode, Notice};
use anyhow::Result;
use colored::*;
use log::info;

/// Run the startup routine once and report what it changed
pub async fn init_command(config: &Config) -> Result<()> {
    info!("Initializing preferences");

    let report = config.init().await?;

    for notice in &report.notices {
        match notice {
            Notice::NonDefault { .. } => println!("{}", notice.to_string().yellow()),
            Notice::RemovedUnused { .. } => println!("{}", notice.to_string().red()),
        }
    }

    let mode = match report.mode {
        InitMode::Reset => "reset to defaults",
        InitMode::Reconcile => "reconciled",
    };
    println!();
    println!(
        "{} Preferences {} ({} seeded, {} non-default, {} removed)",
        "✓".bright_green().bold(),
        mode,
        report.seeded.len(),
        report.drifted().count(),
        report.removed().count()
    );

    Ok(())
}
