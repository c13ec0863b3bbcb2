use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "robot-prefs")]
#[command(about = "Inspect and reconcile persistent robot preferences")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Preferences database (overrides settings and ROBOT_PREFS_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Keep preferences in memory only
    #[arg(long, global = true, conflicts_with = "db")]
    pub memory: bool,

    /// Settings file (overrides ROBOT_PREFS_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run startup reset or reconciliation and print every notice
    Init,
    /// Show registered preferences with their current values
    Show {
        /// Only show keys under this namespace (first key segment)
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// List every key in storage, registered or not
    Keys,
    /// Get the current value of a preference
    Get {
        /// Preference key, e.g. DriveStraight/P
        key: String,
    },
    /// Set the value of a preference
    Set {
        /// Preference key
        key: String,
        /// New value, parsed as the preference's type
        value: String,
    },
    /// Reset a preference to its default value
    Reset {
        /// Preference key
        key: String,
    },
    /// Reset every preference to its default on the next init
    ResetAll {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Write stored preferences to a TOML file
    Export {
        path: PathBuf,
    },
    /// Load preferences from a TOML file
    Import {
        path: PathBuf,
    },
}
