use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or checking an investigation configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in configuration file: {}\n{source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Content parsed but is not a usable variable mapping.
    #[error("{0}")]
    Invalid(String),
}

/// Fatal errors detected before any rule document is processed.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("{0} environment variable is not set.")]
    MissingEnv(&'static str),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidEnv {
        key: &'static str,
        value: String,
        reason: String,
    },
}
