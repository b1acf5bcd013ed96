//! Error types for result persistence.

/// Errors that can occur while converting or writing a result file.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Failed to build Arrow arrays or encode CSV.
    #[error("Arrow conversion error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Failed to write Parquet file.
    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// I/O error when creating/writing the output file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
