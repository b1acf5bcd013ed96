/// Errors that can occur while executing a KQL query.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// Arguments rejected before any request is sent.
    #[error("{0}")]
    InvalidInput(String),

    /// Transport-level failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service rejected the query or answered with an error and no data.
    #[error("Query failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    QueryFailed { status: Option<u16>, message: String },

    /// The request did not complete within the client timeout.
    #[error("Query timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// A successful response that carried no result table.
    #[error("Query response contained no tables")]
    NoTables,

    /// The response body was not the expected JSON shape.
    #[error("Failed to parse query response: {0}")]
    Parse(String),
}
