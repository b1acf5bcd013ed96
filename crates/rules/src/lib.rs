//! Rule documents for KQL hunting queries: schema, loading and validation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{QueryFile, RuleError, RuleLoader};
pub use schema::{LogSource, RuleDocument, RuleLevel, RuleStatus};
pub use validation::{
    validate_document, validate_document_with, validate_yaml, IdPolicy, ValidationError,
    ValidationResult, ValidationWarning,
};
