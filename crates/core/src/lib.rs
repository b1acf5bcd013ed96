//! Shared configuration for the hunt workspace.
//!
//! - [`HuntConfig`]: process-level settings read once from the environment
//! - [`InvestigationConfig`]: the per-case variable mapping fed to query templates

pub mod config;
pub mod error;
pub mod investigation;

pub use config::{HuntConfig, OutputFormat};
pub use error::*;
pub use investigation::InvestigationConfig;
