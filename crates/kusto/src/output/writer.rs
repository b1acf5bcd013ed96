//! Public API for writing query results to disk.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use hunt_core::OutputFormat;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;
use tracing::debug;

use super::builders::build_arrays;
use super::error::OutputError;
use super::schema::{build_schema, ColumnTyping};
use crate::result::QueryResult;

/// Convert a [`QueryResult`] into an Arrow [`RecordBatch`].
pub fn result_to_record_batch(
    result: &QueryResult,
    typing: ColumnTyping,
) -> Result<RecordBatch, OutputError> {
    let schema = Arc::new(build_schema(&result.columns, typing));
    let arrays = build_arrays(&result.rows, &schema);
    let options = RecordBatchOptions::new().with_row_count(Some(result.rows.len()));
    Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
}

/// Write `result` in `format`. Returns the number of data rows written.
pub fn write_output(
    result: &QueryResult,
    path: &Path,
    format: OutputFormat,
) -> Result<u64, OutputError> {
    match format {
        OutputFormat::Csv => write_csv(result, path),
        OutputFormat::Parquet => write_parquet(result, path),
    }
}

/// Write a CSV file: one header row of column names, then one line per row.
///
/// Cells are written verbatim; nulls become empty fields.
pub fn write_csv(result: &QueryResult, path: &Path) -> Result<u64, OutputError> {
    let batch = result_to_record_batch(result, ColumnTyping::Text)?;
    let row_count = batch.num_rows() as u64;

    let file = create_file(path)?;
    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(file);
    writer.write(&batch)?;

    debug!(path = %path.display(), rows = row_count, "Wrote CSV file");
    Ok(row_count)
}

/// Write a typed Parquet file with Zstd compression.
///
/// Query metadata (table name, execution time, partial flag) is stored as
/// key-value metadata in the file footer.
pub fn write_parquet(result: &QueryResult, path: &Path) -> Result<u64, OutputError> {
    let batch = result_to_record_batch(result, ColumnTyping::Native)?;
    let row_count = batch.num_rows() as u64;

    let mut metadata = vec![
        KeyValue::new(
            "kusto.table_name".to_string(),
            Some(result.metadata.table_name.clone()),
        ),
        KeyValue::new(
            "kusto.execution_time_ms".to_string(),
            Some(result.metadata.execution_time_ms.to_string()),
        ),
        KeyValue::new(
            "kusto.partial".to_string(),
            Some(result.metadata.partial.to_string()),
        ),
    ];
    if let Some(err) = &result.metadata.partial_error {
        metadata.push(KeyValue::new("kusto.partial_error".to_string(), Some(err.clone())));
    }

    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(Default::default()))
        .set_key_value_metadata(Some(metadata))
        .build();

    let file = create_file(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    debug!(path = %path.display(), rows = row_count, "Wrote Parquet file");
    Ok(row_count)
}

fn create_file(path: &Path) -> Result<File, OutputError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}
