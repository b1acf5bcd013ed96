//! Result placement: mirror the document's location under the queries root
//! into the results root, swapping the extension for the output format.

use std::fs;
use std::path::{Path, PathBuf};

use hunt_core::OutputFormat;
use hunt_kusto::{write_output, OutputError, QueryResult};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("{} is not under the queries root {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Failed to create results directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Target path for the results of `document`.
///
/// `queries/endpoint/x.yaml` with results root `results` and CSV output
/// becomes `results/endpoint/x.csv`. Parent directories are created.
pub fn results_path(
    queries_root: &Path,
    results_root: &Path,
    document: &Path,
    format: OutputFormat,
) -> Result<PathBuf, PersistError> {
    let relative = document
        .strip_prefix(queries_root)
        .map_err(|_| PersistError::OutsideRoot {
            path: document.to_path_buf(),
            root: queries_root.to_path_buf(),
        })?;
    let target = results_root.join(relative).with_extension(format.extension());

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| PersistError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(target)
}

/// Write `result` to `target`. Returns the number of rows written.
pub fn persist(result: &QueryResult, target: &Path, format: OutputFormat) -> Result<u64, PersistError> {
    Ok(write_output(result, target, format)?)
}
