//! Typed, defaulted preference handles
//!
//! Tunables are declared as constants next to the code that reads them:
//!
//! ```
//! use robot_prefs::prefs::DoubleValue;
//!
//! pub const DRIVE_STRAIGHT_P: DoubleValue = DoubleValue::new("DriveStraight/P", 0.081);
//! ```
//!
//! A handle carries only its key and default. The current value always
//! lives in the [`PreferenceStore`].

use super::store::PreferenceStore;
use super::types::{PrefDefinition, PrefKind, PrefValue};
use anyhow::Result;
use std::fmt;

/// Rust types that map onto one [`PrefKind`]
pub trait PrefType: Copy + Send + Sync + 'static {
    /// What a read returns (`String` for `&'static str` defaults)
    type Owned: Clone + PartialEq + fmt::Display + Into<PrefValue> + Send;

    const KIND: PrefKind;

    fn to_owned_value(self) -> Self::Owned;

    /// Extract the value if it is of this kind
    fn from_value(value: PrefValue) -> Option<Self::Owned>;
}

impl PrefType for &'static str {
    type Owned = String;
    const KIND: PrefKind = PrefKind::String;

    fn to_owned_value(self) -> String {
        self.to_string()
    }

    fn from_value(value: PrefValue) -> Option<String> {
        match value {
            PrefValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl PrefType for i32 {
    type Owned = i32;
    const KIND: PrefKind = PrefKind::Integer;

    fn to_owned_value(self) -> i32 {
        self
    }

    fn from_value(value: PrefValue) -> Option<i32> {
        match value {
            PrefValue::Integer(v) => Some(v),
            _ => None,
        }
    }
}

impl PrefType for f64 {
    type Owned = f64;
    const KIND: PrefKind = PrefKind::Double;

    fn to_owned_value(self) -> f64 {
        self
    }

    fn from_value(value: PrefValue) -> Option<f64> {
        match value {
            PrefValue::Double(v) => Some(v),
            _ => None,
        }
    }
}

impl PrefType for bool {
    type Owned = bool;
    const KIND: PrefKind = PrefKind::Boolean;

    fn to_owned_value(self) -> bool {
        self
    }

    fn from_value(value: PrefValue) -> Option<bool> {
        match value {
            PrefValue::Boolean(v) => Some(v),
            _ => None,
        }
    }
}

/// A named preference with a fixed default
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedValue<T: PrefType> {
    key: &'static str,
    default: T,
    description: &'static str,
}

pub type StringValue = TypedValue<&'static str>;
pub type IntegerValue = TypedValue<i32>;
pub type DoubleValue = TypedValue<f64>;
pub type BooleanValue = TypedValue<bool>;

impl<T: PrefType> TypedValue<T> {
    pub const fn new(key: &'static str, default: T) -> Self {
        Self {
            key,
            default,
            description: "",
        }
    }

    /// Attach help text shown by the CLI
    pub const fn described(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn kind(&self) -> PrefKind {
        T::KIND
    }

    pub fn default_value(&self) -> T::Owned {
        self.default.to_owned_value()
    }

    /// Current persisted value, or the default when absent or of another kind
    pub async fn get(&self, store: &dyn PreferenceStore) -> Result<T::Owned> {
        let current = store.get(self.key).await?.and_then(T::from_value);
        Ok(current.unwrap_or_else(|| self.default_value()))
    }

    pub async fn set(&self, store: &dyn PreferenceStore, value: impl Into<T::Owned>) -> Result<()> {
        let value: T::Owned = value.into();
        store.put(self.key, value.into()).await
    }

    pub async fn exists(&self, store: &dyn PreferenceStore) -> Result<bool> {
        store.contains_key(self.key).await
    }

    pub async fn write_default(&self, store: &dyn PreferenceStore) -> Result<()> {
        self.set(store, self.default_value()).await
    }

    /// Type-erased form held by the registry
    pub fn definition(&self) -> PrefDefinition {
        PrefDefinition::new(self.key, self.default_value()).with_description(self.description)
    }
}
