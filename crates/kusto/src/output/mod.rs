//! Persist a [`QueryResult`](crate::QueryResult) as CSV or Parquet.
//!
//! CSV keeps every cell exactly as the service returned it (all columns
//! text). Parquet maps KQL scalar types to Arrow types and writes typed,
//! Zstd-compressed columns with query metadata in the footer.

mod builders;
mod error;
mod schema;
mod writer;


pub use error::OutputError;
pub use schema::{kusto_type_to_arrow, ColumnTyping};
pub use writer::{result_to_record_batch, write_csv, write_output, write_parquet};
