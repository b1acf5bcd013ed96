//! Investigation configuration: the per-case variables used by query templates.
//!
//! The loader returns the mapping exactly as written. Alias pairs such as
//! `device_name` / `devicename` are left for the consumer to reconcile.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

use crate::error::ConfigError;

/// Flat mapping of variable name to YAML value, scoped to one investigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InvestigationConfig {
    values: BTreeMap<String, Value>,
}

impl InvestigationConfig {
    /// Load and check a YAML configuration file.
    ///
    /// Fails with [`ConfigError::NotFound`] when the path does not exist,
    /// [`ConfigError::Parse`] on malformed YAML, and [`ConfigError::Invalid`]
    /// when the document is empty or is not a mapping.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let source = path.display().to_string();
        if contents.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Configuration file is empty: {source}"
            )));
        }

        let value: Value = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_value(value, &source)?;
        debug!(path = %source, variables = config.len(), "loaded investigation config");
        Ok(config)
    }

    /// Build from an already-parsed YAML value. `source` names the origin in errors.
    pub fn from_value(value: Value, source: &str) -> Result<Self, ConfigError> {
        let mapping = match value {
            Value::Null => {
                return Err(ConfigError::Invalid(format!(
                    "Configuration file is empty: {source}"
                )))
            }
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "Configuration file must contain a YAML dictionary, got {}: {source}",
                    kind_name(&other)
                )))
            }
        };

        if mapping.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Configuration file is empty: {source}"
            )));
        }

        let mut values = BTreeMap::new();
        for (key, value) in mapping {
            let key = scalar_to_string(&key).ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "Configuration keys must be scalars, got {}: {source}",
                    kind_name(&key)
                ))
            })?;
            values.insert(key, value);
        }

        Ok(Self { values })
    }

    /// Build directly from a map; no emptiness check is applied.
    pub fn from_map(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    /// Check that the config is non-empty and that every key in `required`
    /// is present with a non-null, non-empty value.
    ///
    /// Missing keys are reported before empty ones.
    pub fn validate_required<S: AsRef<str>>(&self, required: &[S]) -> Result<(), ConfigError> {
        if self.values.is_empty() {
            return Err(ConfigError::Invalid("Configuration dictionary is empty".to_string()));
        }

        let mut missing = Vec::new();
        let mut empty = Vec::new();
        for key in required {
            let key = key.as_ref();
            match self.values.get(key) {
                None => missing.push(key),
                Some(Value::Null) => empty.push(key),
                Some(Value::String(s)) if s.is_empty() => empty.push(key),
                Some(_) => {}
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Missing required configuration fields: {}",
                missing.join(", ")
            )));
        }
        if !empty.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Required configuration fields cannot be empty: {}",
                empty.join(", ")
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

/// Render a YAML scalar as text. Collections and null yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Short type name used in error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
