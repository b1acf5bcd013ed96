//! Filesystem rule loading.
//!
//! Discovers rule documents recursively under a root in deterministic
//! (lexicographic) order and reads individual documents as raw YAML or as
//! query files with a `kql` template.

mod core;
mod error;


pub use self::core::{QueryFile, RuleLoader};
pub(crate) use self::core::kind_name;
pub use self::error::{Result, RuleError};
