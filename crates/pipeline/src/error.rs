use hunt_kusto::ExecutionError;
use hunt_rules::RuleError;
use hunt_template::TemplateError;

use crate::persist::PersistError;

/// Failure of one document at one stage. Never escapes the runner; it is
/// recorded as the document's outcome error.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Render error: {0}")]
    Render(#[from] TemplateError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Persist error: {0}")]
    Persist(#[from] PersistError),

    /// Unreadable file, malformed YAML.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl StageError {
    /// Log tag for the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Validation(_) => "YAML CHECK",
            StageError::Render(_) => "RENDER",
            StageError::Execution(_) => "QUERY EXECUTION",
            StageError::Persist(_) => "EXPORT",
            StageError::Unexpected(_) => "FATAL",
        }
    }
}

/// Errors that abort a whole run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to discover rule documents: {0}")]
    Discovery(#[from] RuleError),
}
