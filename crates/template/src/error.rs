use std::fmt;

use hunt_rules::RuleError;

/// Errors produced while rendering a query template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A free variable had no value in the supplied variables.
    #[error("Undefined variable '{name}' in query template")]
    UndefinedVariable { name: String },

    /// The template could not be parsed.
    #[error("Invalid template syntax{}: {message}", LineSuffix(.line))]
    Syntax { line: Option<usize>, message: String },

    /// Any other evaluation failure (bad filter arguments, undefined attributes).
    #[error("Template render failed: {0}")]
    Render(String),
}

struct LineSuffix<'a>(&'a Option<usize>);

impl fmt::Display for LineSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(line) => write!(f, " (line {line})"),
            None => Ok(()),
        }
    }
}

/// Errors from loading a query file and rendering its `kql` template in one step.
#[derive(Debug, thiserror::Error)]
pub enum QueryFileError {
    #[error(transparent)]
    Load(#[from] RuleError),

    #[error(transparent)]
    Render(#[from] TemplateError),
}
