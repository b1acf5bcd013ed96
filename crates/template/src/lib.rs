//! Strict KQL query template rendering with variable discovery.
//!
//! Templates use minijinja syntax (`{{ device_name }}`). Rendering is strict:
//! any free variable that is not supplied fails with
//! [`TemplateError::UndefinedVariable`] instead of producing an empty string.

mod error;
mod file;
mod renderer;

pub use error::{QueryFileError, TemplateError};
pub use file::render_query_file;
pub use renderer::{discover_variables, render, QueryRenderer, BUILTIN_GLOBALS};
