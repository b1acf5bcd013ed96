//! Error types for the rule loader.

use std::path::PathBuf;

/// Errors that can occur while discovering or reading rule documents.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The rule file or discovery root does not exist.
    #[error("Query YAML file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Filesystem I/O error.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal error.
    #[error("Failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// YAML parse/deserialization error.
    #[error("Failed to parse YAML file: {}\n{source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Document parsed but lacks the shape a query file needs.
    #[error("{0}")]
    Invalid(String),
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
