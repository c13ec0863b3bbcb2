use crate::config::Config;
use anyhow::Result;
use colored::*;
use log::info;

/// Show registered preferences with their current values
pub async fn show_command(config: &Config, namespace: Option<String>) -> Result<()> {
    info!("Showing preferences (namespace: {:?})", namespace);

    let preferences = &config.preferences;
    let entries = match &namespace {
        Some(ns) => preferences.namespace_entries(ns).await?,
        None => preferences.entries().await?,
    };

    if entries.is_empty() {
        match namespace {
            Some(ns) => println!("No preferences registered under '{}'", ns),
            None => println!("No preferences registered"),
        }
        return Ok(());
    }

    println!("{}", "Preferences:".bold());
    println!("{}", "=".repeat(20));

    let width = entries.iter().map(|e| e.definition.key.len()).max().unwrap_or(0);
    for entry in &entries {
        let key = format!("{:width$}", entry.definition.key, width = width);
        let kind = format!("[{}]", entry.definition.kind());
        if entry.is_default {
            println!("  {} {} {}", key, kind.dimmed(), entry.current);
        } else {
            println!(
                "  {} {} {} {}",
                key.yellow().bold(),
                kind.dimmed(),
                entry.current.to_string().yellow().bold(),
                format!("(default {})", entry.definition.default).dimmed()
            );
        }
        if !entry.definition.description.is_empty() {
            println!("  {:width$} {}", "", entry.definition.description.dimmed(), width = width);
        }
    }

    println!();
    println!("Use 'set <key> <value>' to change a preference");
    println!("Use 'reset <key>' to reset a preference to default");

    Ok(())
}

/// List every stored key, flagging ones no preference is registered for
pub async fn keys_command(config: &Config) -> Result<()> {
    info!("Listing stored keys");

    let preferences = &config.preferences;
    let reserved_prefix = &config.settings.reconcile.reserved_prefix;
    let keys = preferences.store().keys().await?;

    if keys.is_empty() {
        println!("  {}", "Nothing stored yet. Run 'init' to seed defaults.".dimmed());
        return Ok(());
    }

    for key in keys {
        if preferences.registry().contains(&key) {
            println!("  {}", key);
        } else if !reserved_prefix.is_empty() && key.starts_with(reserved_prefix.as_str()) {
            println!("  {} {}", key.dimmed(), "(reserved)".dimmed());
        } else {
            println!("  {} {}", key.red(), "(unregistered, removed on next reconcile)".red());
        }
    }

    Ok(())
}
