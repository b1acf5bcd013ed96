//! Build Arrow arrays from text result rows.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder,
    TimestampMillisecondBuilder,
};
use arrow::datatypes::{DataType, Schema, TimeUnit};

/// Build one array per schema field from the text rows.
///
/// Values that do not parse as the target type become null rather than
/// failing the whole file.
pub(crate) fn build_arrays(rows: &[Vec<Option<String>>], schema: &Schema) -> Vec<ArrayRef> {
    let num_rows = rows.len();
    let cells = |col_idx: usize| {
        rows.iter()
            .map(move |row| row.get(col_idx).and_then(|v| v.as_deref()))
    };

    schema
        .fields()
        .iter()
        .enumerate()
        .map(|(col_idx, field)| -> ArrayRef {
            match field.data_type() {
                DataType::Int64 => {
                    let mut builder = Int64Builder::with_capacity(num_rows);
                    for cell in cells(col_idx) {
                        builder.append_option(cell.and_then(|s| s.parse::<i64>().ok()));
                    }
                    Arc::new(builder.finish())
                }
                DataType::Float64 => {
                    let mut builder = Float64Builder::with_capacity(num_rows);
                    for cell in cells(col_idx) {
                        builder.append_option(cell.and_then(|s| s.parse::<f64>().ok()));
                    }
                    Arc::new(builder.finish())
                }
                DataType::Boolean => {
                    let mut builder = BooleanBuilder::with_capacity(num_rows);
                    for cell in cells(col_idx) {
                        builder.append_option(cell.and_then(parse_bool));
                    }
                    Arc::new(builder.finish())
                }
                DataType::Timestamp(TimeUnit::Millisecond, _) => {
                    let mut builder = TimestampMillisecondBuilder::with_capacity(num_rows);
                    for cell in cells(col_idx) {
                        builder.append_option(cell.and_then(parse_timestamp_ms));
                    }
                    Arc::new(builder.finish().with_timezone("UTC"))
                }
                _ => {
                    let mut builder = StringBuilder::with_capacity(num_rows, num_rows * 32);
                    for cell in cells(col_idx) {
                        builder.append_option(cell);
                    }
                    Arc::new(builder.finish())
                }
            }
        })
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a timestamp string into epoch milliseconds.
///
/// Supports:
/// 1. RFC 3339 with any fractional precision: `2025-01-14T10:30:00.1234567Z`
/// 2. Space-separated: `2025-01-14 10:30:00[.fff]`
/// 3. Date only: `2025-01-14` (midnight UTC)
pub(crate) fn parse_timestamp_ms(value: &str) -> Option<i64> {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).timestamp_millis());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ndt.and_utc().timestamp_millis());
    }
    if let Ok(nd) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(nd.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }
    None
}
