use std::fmt;

use serde::{Deserialize, Serialize};

/// Column definition returned by a KQL query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KustoColumn {
    pub name: String,
    /// KQL scalar type (`string`, `long`, `real`, `bool`, `datetime`, `dynamic`, ...).
    pub data_type: String,
}

impl KustoColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Execution metadata for a completed query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryMetadata {
    /// Name of the returned table, usually `PrimaryResult`.
    pub table_name: String,
    /// The service returned data together with an error.
    pub partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_error: Option<String>,
    /// Wall-clock request time in milliseconds.
    pub execution_time_ms: u64,
}

/// Tabular result of a KQL query.
///
/// Cells are text; `None` is a KQL null. Column ordering in each row matches
/// `columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<KustoColumn>,
    pub rows: Vec<Vec<Option<String>>>,
    pub metadata: QueryMetadata,
}

impl QueryResult {
    /// Result with default metadata.
    pub fn new(columns: Vec<KustoColumn>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self {
            columns,
            rows,
            metadata: QueryMetadata::default(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return write!(f, "(empty result set)");
        }

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.name.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.as_deref().unwrap_or("NULL").len());
            }
        }

        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{:<width$}", col.name, width = widths[i])?;
        }
        writeln!(f)?;

        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                write!(f, "-+-")?;
            }
            write!(f, "{}", "-".repeat(*w))?;
        }
        writeln!(f)?;

        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                if i > 0 {
                    write!(f, " | ")?;
                }
                write!(f, "{:<width$}", cell.as_deref().unwrap_or("NULL"), width = widths[i])?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        write!(
            f,
            "{} | {} rows | {}ms",
            if self.metadata.table_name.is_empty() { "result" } else { self.metadata.table_name.as_str() },
            self.rows.len(),
            self.metadata.execution_time_ms,
        )?;
        if self.metadata.partial {
            write!(f, " | PARTIAL")?;
        }
        Ok(())
    }
}
