pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod output;
pub mod result;

pub use client::LogAnalyticsClient;
pub use config::LogAnalyticsConfig;
pub use error::ExecutionError;
pub use executor::QueryExecutor;
#[cfg(any(test, feature = "test-utils"))]
pub use executor::{ExecutedQuery, StaticExecutor};
pub use output::{result_to_record_batch, write_csv, write_output, write_parquet, ColumnTyping, OutputError};
pub use result::{KustoColumn, QueryMetadata, QueryResult};
