//! Typed robot preferences backed by persistent storage
//!
//! The preferences system provides:
//! - Typed, defaulted tunables declared as constants
//! - A registration table of every declared tunable
//! - Pluggable persistent storage (SQLite, in-memory)
//! - Startup reset/reconciliation against the declared defaults

pub mod preferences;
pub mod reconcile;
pub mod registrations;
pub mod registry;
pub mod store;
pub mod transfer;
pub mod types;
pub mod value;

pub use preferences::{InitState, PrefEntry, Preferences};
pub use reconcile::{InitMode, InitReport, Notice, ReconcileOptions, Reconciler};
pub use registry::{PreferencesRegistry, WRITE_DEFAULT};
pub use store::{MemoryStore, PreferenceStore, SqliteStore};
pub use types::{PrefDefinition, PrefKind, PrefValue};
pub use value::{BooleanValue, DoubleValue, IntegerValue, PrefType, StringValue, TypedValue};
