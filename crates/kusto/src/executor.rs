//! The query-execution seam between the pipeline and the telemetry store.

use async_trait::async_trait;

use crate::error::ExecutionError;
use crate::result::QueryResult;

/// Executes a rendered KQL query against a workspace.
///
/// Implementations own their transport concerns (auth, timeout); every
/// failure surfaces as an [`ExecutionError`].
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(
        &self,
        workspace_id: &str,
        query: &str,
        timespan: Option<&str>,
    ) -> Result<QueryResult, ExecutionError>;
}

#[cfg(any(test, feature = "test-utils"))]
mod fake {
    use std::sync::Mutex;

    use super::*;

    /// One recorded call to [`StaticExecutor::execute`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ExecutedQuery {
        pub workspace_id: String,
        pub query: String,
        pub timespan: Option<String>,
    }

    /// In-memory executor returning a canned result.
    ///
    /// Queries containing a registered needle fail with
    /// [`ExecutionError::QueryFailed`]. Every call is recorded.
    #[derive(Debug)]
    pub struct StaticExecutor {
        result: QueryResult,
        failures: Vec<(String, String)>,
        calls: Mutex<Vec<ExecutedQuery>>,
    }

    impl StaticExecutor {
        pub fn new(result: QueryResult) -> Self {
            Self {
                result,
                failures: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Fail any query whose text contains `needle`.
        pub fn failing_on(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
            self.failures.push((needle.into(), message.into()));
            self
        }

        pub fn calls(&self) -> Vec<ExecutedQuery> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl QueryExecutor for StaticExecutor {
        async fn execute(
            &self,
            workspace_id: &str,
            query: &str,
            timespan: Option<&str>,
        ) -> Result<QueryResult, ExecutionError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(ExecutedQuery {
                    workspace_id: workspace_id.to_string(),
                    query: query.to_string(),
                    timespan: timespan.map(str::to_string),
                });
            }

            if let Some((_, message)) = self.failures.iter().find(|(needle, _)| query.contains(needle.as_str())) {
                return Err(ExecutionError::QueryFailed {
                    status: Some(400),
                    message: message.clone(),
                });
            }
            Ok(self.result.clone())
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use fake::{ExecutedQuery, StaticExecutor};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::KustoColumn;

    fn one_row() -> QueryResult {
        QueryResult::new(
            vec![KustoColumn::new("n", "long")],
            vec![vec![Some("1".into())]],
        )
    }

    #[tokio::test]
    async fn static_executor_records_calls() {
        let exec = StaticExecutor::new(one_row());
        let result = exec.execute("ws", "T | take 1", Some("P1D")).await.unwrap();
        assert_eq!(result.row_count(), 1);

        let calls = exec.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].workspace_id, "ws");
        assert_eq!(calls[0].timespan.as_deref(), Some("P1D"));
    }

    #[tokio::test]
    async fn static_executor_fails_on_needle() {
        let exec = StaticExecutor::new(one_row()).failing_on("BadTable", "Failed to resolve table");
        let err = exec.execute("ws", "BadTable | take 1", None).await.unwrap_err();
        assert!(matches!(err, ExecutionError::QueryFailed { .. }));
        assert!(exec.execute("ws", "GoodTable", None).await.is_ok());
        assert_eq!(exec.calls().len(), 2);
    }

    #[tokio::test]
    async fn executor_is_object_safe() {
        let exec = StaticExecutor::new(one_row());
        let dyn_exec: &dyn QueryExecutor = &exec;
        assert!(dyn_exec.execute("ws", "T", None).await.is_ok());
    }
}
