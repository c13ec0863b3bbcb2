use crate::config::Config;
use anyhow::Result;
use colored::*;
use dialoguer::Confirm;
use log::info;

pub async fn get_command(config: &Config, key: &str) -> Result<()> {
    info!("Getting preference: {}", key);

    let value = config.preferences.get(key).await?;
    println!("{}", value);

    Ok(())
}

pub async fn set_command(config: &Config, key: &str, raw: &str) -> Result<()> {
    info!("Setting preference {} = {}", key, raw);

    let value = config.preferences.set_raw(key, raw).await?;
    println!("{} {} = {}", "✓".bright_green().bold(), key, value.to_string().bright_green());

    Ok(())
}

pub async fn reset_command(config: &Config, key: &str) -> Result<()> {
    info!("Resetting preference {} to default", key);

    let value = config.preferences.reset(key).await?;
    println!("{} {} reset to {}", "✓".bright_green().bold(), key, value);

    Ok(())
}

/// Flag the store so the next init writes every default
pub async fn reset_all_command(config: &Config, force: bool) -> Result<()> {
    info!("Requesting reset of all preferences (force: {})", force);

    if !force {
        let confirmed = Confirm::new()
            .with_prompt("Reset ALL preferences to their defaults on the next init?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Reset cancelled");
            return Ok(());
        }
    }

    config.preferences.request_reset().await?;
    println!(
        "{} All preferences will be reset on the next init",
        "✓".bright_green().bold()
    );

    Ok(())
}
