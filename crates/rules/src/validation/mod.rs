//! Structural rule validation with structured errors and suggestions.
//!
//! Works on the raw YAML value so that every defect of a malformed document
//! is reported in one pass, instead of stopping at the first serde error.
//! Returns a [`ValidationResult`] with errors (document rejected) and
//! warnings (advisory).

mod schema_checks;

pub mod fuzzy;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dotted location, e.g. `"logsource.table"`. Empty for the whole document.
    pub path: String,
    pub message: String,
    /// Optional "Did you mean …?" suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suggestion {
            Some(suggestion) => write!(f, "{} {}", self.message, suggestion),
            None => f.write_str(&self.message),
        }
    }
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: Option<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion,
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Error messages in report order, suggestions appended.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

// ── Identifier policy ───────────────────────────────────────────────

/// How strictly the `id` field is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Must parse as a UUID with version 4.
    #[default]
    UuidV4,
    /// Any well-formed UUID (legacy rule sets with v1/v5 ids).
    AnyUuid,
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a parsed rule document under the default [`IdPolicy`].
pub fn validate_document(doc: &Value) -> ValidationResult {
    validate_document_with(doc, IdPolicy::default())
}

/// Validate a parsed rule document. Pure; never panics.
pub fn validate_document_with(doc: &Value, policy: IdPolicy) -> ValidationResult {
    let mut result = ValidationResult::new();

    let empty = serde_yaml::Mapping::new();
    let mapping = match doc {
        Value::Mapping(mapping) => mapping,
        other => {
            result.error(
                "",
                format!(
                    "Rule document must be a mapping/dictionary, got {}.",
                    crate::loader::kind_name(other)
                ),
            );
            &empty
        }
    };

    schema_checks::validate_required(mapping, &mut result);
    schema_checks::validate_unknown_fields(mapping, &mut result);
    schema_checks::validate_logsource(mapping, &mut result);
    schema_checks::validate_kql(mapping, &mut result);
    schema_checks::validate_id(mapping, policy, &mut result);
    schema_checks::validate_enums(mapping, &mut result);
    result
}

/// Parse raw YAML and validate. Parse errors are reported as a single error.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(doc) => validate_document(&doc),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", format!("YAML parse error: {e}"));
            result
        }
    }
}

#[cfg(test)]
mod tests;
