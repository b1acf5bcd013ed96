//! Log Analytics query client.
//!
//! Provides [`LogAnalyticsClient`] for executing KQL against a workspace
//! through the REST query API, with a client-side timeout, partial-result
//! detection and structured parsing into [`QueryResult`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::LogAnalyticsConfig;
use crate::error::ExecutionError;
use crate::executor::QueryExecutor;
use crate::result::{KustoColumn, QueryMetadata, QueryResult};

/// Client for the `POST /v1/workspaces/{id}/query` endpoint.
///
/// The HTTP client is built once and reused across queries (connection
/// pooling). Authentication is a pre-issued bearer token, if configured.
#[derive(Debug)]
pub struct LogAnalyticsClient {
    config: LogAnalyticsConfig,
    client: reqwest::Client,
}

impl LogAnalyticsClient {
    pub fn new(config: LogAnalyticsConfig) -> Result<Self, ExecutionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ExecutionError::Http(e.to_string()))?;

        info!(
            endpoint = %config.endpoint,
            timeout_seconds = config.timeout_seconds,
            authenticated = config.token.is_some(),
            "LogAnalyticsClient initialised"
        );

        Ok(Self { config, client })
    }

    /// Execute a KQL query and return the first result table.
    ///
    /// A response carrying both tables and an `error` object is a partial
    /// success: the rows are returned and `metadata.partial` is set.
    pub async fn execute_query(
        &self,
        workspace_id: &str,
        query: &str,
        timespan: Option<&str>,
    ) -> Result<QueryResult, ExecutionError> {
        validate_inputs(workspace_id, query)?;

        let url = self.config.query_url(workspace_id.trim());
        debug!(url = %url, timespan = ?timespan, "Starting Log Analytics query");

        let mut request = self.client.post(&url).json(&request_body(query, timespan));
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let start = Instant::now();
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let result = parse_response(status, &body, elapsed_ms)?;
        info!(
            rows = result.row_count(),
            columns = result.column_count(),
            elapsed_ms,
            partial = result.metadata.partial,
            "Query completed"
        );
        Ok(result)
    }

    fn transport_error(&self, err: reqwest::Error) -> ExecutionError {
        if err.is_timeout() {
            ExecutionError::Timeout {
                seconds: self.config.timeout_seconds,
            }
        } else {
            ExecutionError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl QueryExecutor for LogAnalyticsClient {
    async fn execute(
        &self,
        workspace_id: &str,
        query: &str,
        timespan: Option<&str>,
    ) -> Result<QueryResult, ExecutionError> {
        self.execute_query(workspace_id, query, timespan).await
    }
}

// ---------------------------------------------------------------------------
// Request / response helpers
// ---------------------------------------------------------------------------

fn validate_inputs(workspace_id: &str, query: &str) -> Result<(), ExecutionError> {
    if workspace_id.trim().is_empty() {
        return Err(ExecutionError::InvalidInput(
            "workspace_id must be a non-empty string".into(),
        ));
    }
    if query.trim().is_empty() {
        return Err(ExecutionError::InvalidInput(
            "kql_query must be a non-empty string".into(),
        ));
    }
    Ok(())
}

fn request_body(query: &str, timespan: Option<&str>) -> Value {
    let mut body = json!({ "query": query });
    if let Some(timespan) = timespan {
        body["timespan"] = json!(timespan);
    }
    body
}

/// Parse a query API response body into a [`QueryResult`].
pub(crate) fn parse_response(
    status: u16,
    body: &str,
    elapsed_ms: u64,
) -> Result<QueryResult, ExecutionError> {
    let success = (200..300).contains(&status);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !success => {
            return Err(ExecutionError::QueryFailed {
                status: Some(status),
                message: snippet(body),
            })
        }
        Err(e) => return Err(ExecutionError::Parse(e.to_string())),
    };

    let error_message = value.get("error").map(describe_error);

    if !success {
        return Err(ExecutionError::QueryFailed {
            status: Some(status),
            message: error_message.unwrap_or_else(|| format!("HTTP {status}")),
        });
    }

    let table = match value
        .get("tables")
        .and_then(Value::as_array)
        .and_then(|tables| tables.first())
    {
        Some(table) => table,
        None => {
            return Err(match error_message {
                Some(message) => ExecutionError::QueryFailed {
                    status: Some(status),
                    message,
                },
                None => ExecutionError::NoTables,
            })
        }
    };

    let (columns, rows) = parse_table(table)?;

    if let Some(message) = &error_message {
        warn!(error = %message, rows = rows.len(), "Query returned partial results");
    }

    Ok(QueryResult {
        columns,
        rows,
        metadata: QueryMetadata {
            table_name: table
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("PrimaryResult")
                .to_string(),
            partial: error_message.is_some(),
            partial_error: error_message,
            execution_time_ms: elapsed_ms,
        },
    })
}

fn parse_table(table: &Value) -> Result<(Vec<KustoColumn>, Vec<Vec<Option<String>>>), ExecutionError> {
    let columns: Vec<KustoColumn> = table
        .get("columns")
        .and_then(Value::as_array)
        .ok_or_else(|| ExecutionError::Parse("result table has no 'columns' array".into()))?
        .iter()
        .map(|col| {
            let name = col.get("name").and_then(Value::as_str);
            let data_type = col.get("type").and_then(Value::as_str).unwrap_or("string");
            name.map(|name| KustoColumn::new(name, data_type))
                .ok_or_else(|| ExecutionError::Parse("column without a 'name'".into()))
        })
        .collect::<Result<_, _>>()?;

    let raw_rows = table
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| ExecutionError::Parse("result table has no 'rows' array".into()))?;

    let mut rows = Vec::with_capacity(raw_rows.len());
    for (idx, raw) in raw_rows.iter().enumerate() {
        let cells = raw
            .as_array()
            .ok_or_else(|| ExecutionError::Parse(format!("row {idx} is not an array")))?;
        if cells.len() != columns.len() {
            return Err(ExecutionError::Parse(format!(
                "row {idx} has {} cells, expected {}",
                cells.len(),
                columns.len()
            )));
        }
        rows.push(cells.iter().map(cell_to_string).collect());
    }

    Ok((columns, rows))
}

/// Render one JSON cell as text. Nested values stay JSON.
fn cell_to_string(cell: &Value) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Flatten an API error object: the top message followed by nested inner errors.
fn describe_error(error: &Value) -> String {
    let mut parts = Vec::new();
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(message) = err.get("message").and_then(Value::as_str) {
            match err.get("code").and_then(Value::as_str) {
                Some(code) => parts.push(format!("{message} ({code})")),
                None => parts.push(message.to_string()),
            }
        }
        current = err.get("innererror");
    }

    if parts.is_empty() {
        error.to_string()
    } else {
        parts.join(": ")
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
