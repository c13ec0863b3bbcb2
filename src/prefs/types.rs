//! Core types for the preferences system

use anyhow::{Context, Result};
use std::fmt;

/// The closed set of kinds a preference can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKind {
    String,
    Integer,
    Double,
    Boolean,
}

impl PrefKind {
    /// Name used when persisting the kind alongside a value
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefKind::String => "string",
            PrefKind::Integer => "integer",
            PrefKind::Double => "double",
            PrefKind::Boolean => "boolean",
        }
    }

    /// Inverse of [`PrefKind::as_str`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(PrefKind::String),
            "integer" => Some(PrefKind::Integer),
            "double" => Some(PrefKind::Double),
            "boolean" => Some(PrefKind::Boolean),
            _ => None,
        }
    }

    /// Parse the text form of a value as this kind
    pub fn parse(&self, raw: &str) -> Result<PrefValue> {
        match self {
            PrefKind::String => Ok(PrefValue::String(raw.to_string())),
            PrefKind::Integer => {
                let value = raw.trim().parse::<i32>()
                    .with_context(|| format!("Failed to parse '{}' as integer", raw))?;
                Ok(PrefValue::Integer(value))
            }
            PrefKind::Double => {
                let value = raw.trim().parse::<f64>()
                    .with_context(|| format!("Failed to parse '{}' as double", raw))?;
                Ok(PrefValue::Double(value))
            }
            PrefKind::Boolean => {
                let value = raw.trim().parse::<bool>()
                    .with_context(|| format!("Failed to parse '{}' as boolean", raw))?;
                Ok(PrefValue::Boolean(value))
            }
        }
    }
}

impl fmt::Display for PrefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strongly-typed preference value
///
/// Equality is exact for every variant, including `Double`.
#[derive(Debug, Clone, PartialEq)]
pub enum PrefValue {
    String(String),
    Integer(i32),
    Double(f64),
    Boolean(bool),
}

impl PrefValue {
    pub fn kind(&self) -> PrefKind {
        match self {
            PrefValue::String(_) => PrefKind::String,
            PrefValue::Integer(_) => PrefKind::Integer,
            PrefValue::Double(_) => PrefKind::Double,
            PrefValue::Boolean(_) => PrefKind::Boolean,
        }
    }

    /// Get as string, returning error if wrong type
    pub fn as_string(&self) -> Result<String> {
        match self {
            PrefValue::String(v) => Ok(v.clone()),
            _ => anyhow::bail!("Expected String, got {:?}", self),
        }
    }

    /// Get as integer, returning error if wrong type
    pub fn as_int(&self) -> Result<i32> {
        match self {
            PrefValue::Integer(v) => Ok(*v),
            _ => anyhow::bail!("Expected Integer, got {:?}", self),
        }
    }

    /// Get as double, returning error if wrong type
    pub fn as_double(&self) -> Result<f64> {
        match self {
            PrefValue::Double(v) => Ok(*v),
            _ => anyhow::bail!("Expected Double, got {:?}", self),
        }
    }

    /// Get as bool, returning error if wrong type
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            PrefValue::Boolean(v) => Ok(*v),
            _ => anyhow::bail!("Expected Boolean, got {:?}", self),
        }
    }
}

/// Renders the bare value, strings unquoted
impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::String(v) => f.write_str(v),
            PrefValue::Integer(v) => write!(f, "{}", v),
            PrefValue::Double(v) => write!(f, "{}", v),
            PrefValue::Boolean(v) => write!(f, "{}", v),
        }
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::String(value)
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::String(value.to_string())
    }
}

impl From<i32> for PrefValue {
    fn from(value: i32) -> Self {
        PrefValue::Integer(value)
    }
}

impl From<f64> for PrefValue {
    fn from(value: f64) -> Self {
        PrefValue::Double(value)
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Boolean(value)
    }
}

/// Type-erased definition of a registered preference
#[derive(Debug, Clone, PartialEq)]
pub struct PrefDefinition {
    /// Full key, `/`-separated for display grouping (e.g., "DriveStraight/P")
    pub key: String,

    /// Value written on reset and used when the key is absent
    pub default: PrefValue,

    /// Help text shown by the CLI
    pub description: String,
}

impl PrefDefinition {
    pub fn new(key: impl Into<String>, default: impl Into<PrefValue>) -> Self {
        Self {
            key: key.into(),
            default: default.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn kind(&self) -> PrefKind {
        self.default.kind()
    }

    /// First `/` segment of the key, or the whole key when it has none
    pub fn namespace(&self) -> &str {
        self.key.split('/').next().unwrap_or(&self.key)
    }

    /// Check that a value may be stored under this definition
    pub fn validate(&self, value: &PrefValue) -> Result<()> {
        if value.kind() != self.kind() {
            anyhow::bail!(
                "Type mismatch for '{}': expected {}, got {}",
                self.key,
                self.kind(),
                value.kind()
            );
        }
        Ok(())
    }
}
