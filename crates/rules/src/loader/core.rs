//! Core [`RuleLoader`]: rule file discovery and single-document reads.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::error::{Result, RuleError};

/// Filesystem-backed rule loader rooted at a discovery directory.
///
/// Documents are read on demand; nothing is cached between passes.
#[derive(Debug, Clone)]
pub struct RuleLoader {
    root: PathBuf,
}

/// A rule file reduced to what rendering needs: the raw YAML and its `kql` template.
#[derive(Debug, Clone)]
pub struct QueryFile {
    pub path: PathBuf,
    pub raw: Value,
    pub kql: String,
}

impl RuleLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Recursively find every `*.yaml` / `*.yml` file under the root.
    ///
    /// Dotfiles and dot-directories are skipped. The result is sorted by path
    /// so repeated runs visit documents in the same order.
    ///
    /// Only an unreadable root fails discovery. A rule file that cannot be
    /// stat'ed (e.g. a dangling symlink) is still returned so it fails on
    /// read like any other broken document; other unreadable entries are
    /// skipped with a warning.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Err(RuleError::NotFound(self.root.clone()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) if source.depth() == 0 => {
                    return Err(RuleError::Walk {
                        root: self.root.clone(),
                        source,
                    })
                }
                Err(err) => {
                    match err.path() {
                        Some(path) if is_rule_file(path) && !has_hidden_name(path) => {
                            warn!(path = %path.display(), error = %err, "unreadable rule file");
                            files.push(path.to_path_buf());
                        }
                        Some(path) => {
                            warn!(path = %path.display(), error = %err, "skipping unreadable entry")
                        }
                        None => warn!(error = %err, "skipping unreadable entry"),
                    }
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            if is_rule_file(&path) {
                files.push(path);
            } else {
                debug!(path = %path.display(), "skipping non-YAML file");
            }
        }

        files.sort();
        debug!(root = %self.root.display(), count = files.len(), "discovered rule files");
        Ok(files)
    }

    /// Read and parse a rule file into raw YAML without any schema checks.
    pub fn read_value(path: &Path) -> Result<Value> {
        if !path.exists() {
            return Err(RuleError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&contents).map_err(|source| RuleError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a query file: the document must be a mapping with a string `kql` field.
    ///
    /// This is the minimal contract for rendering; the full schema is checked
    /// by [`crate::validation::validate_document`].
    pub fn load_query(path: &Path) -> Result<QueryFile> {
        let raw = Self::read_value(path)?;

        if !raw.is_mapping() {
            return Err(RuleError::Invalid(format!(
                "Query YAML must contain a dictionary structure, got {}",
                kind_name(&raw)
            )));
        }

        let kql = match raw.get("kql") {
            None => {
                return Err(RuleError::Invalid(format!(
                    "Query YAML must contain 'kql' field: {}",
                    path.display()
                )))
            }
            Some(Value::String(kql)) => kql.clone(),
            Some(other) => {
                warn!(path = %path.display(), "kql field is not a string");
                return Err(RuleError::Invalid(format!(
                    "Query 'kql' field must be a string, got {}",
                    kind_name(other)
                )));
            }
        };

        Ok(QueryFile {
            path: path.to_path_buf(),
            raw,
            kql,
        })
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|n| n.starts_with('.')).unwrap_or(false)
}

fn has_hidden_name(path: &Path) -> bool {
    path.file_name().map(is_hidden).unwrap_or(false)
}

fn is_rule_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
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
