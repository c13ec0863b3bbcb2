//! Typed, persistent robot preferences with startup reconciliation
//!
//! ```no_run
//! use robot_prefs::config::{Config, Settings};
//! use robot_prefs::prefs::registrations::drive_straight;
//!
//! # async fn boot() -> anyhow::Result<()> {
//! let config = Config::load(Settings::default()).await?;
//! for notice in config.init().await?.notices {
//!     println!("{}", notice);
//! }
//!
//! let p = drive_straight::P.get(config.preferences.store()).await?;
//! # let _ = p;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod prefs;
