//! KQL type to Arrow type mapping and schema construction.

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};

use crate::result::KustoColumn;

/// How result columns are typed when building Arrow data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTyping {
    /// Map KQL types to native Arrow types.
    Native,
    /// Every column is UTF-8, cells verbatim.
    Text,
}

/// Map a KQL scalar type name to an Arrow DataType.
///
/// KQL types are documented at:
/// <https://learn.microsoft.com/azure/data-explorer/kusto/query/scalar-data-types/>
pub fn kusto_type_to_arrow(kusto_type: &str) -> DataType {
    match kusto_type.to_lowercase().as_str() {
        "bool" | "boolean" => DataType::Boolean,

        "int" | "long" => DataType::Int64,

        "real" | "double" | "decimal" => DataType::Float64,

        "datetime" | "date" => DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),

        // string, guid, timespan, dynamic (JSON text)
        _ => DataType::Utf8,
    }
}

/// Build an Arrow [`Schema`] from result column definitions.
pub(crate) fn build_schema(columns: &[KustoColumn], typing: ColumnTyping) -> Schema {
    let fields: Vec<Field> = columns
        .iter()
        .map(|col| {
            let data_type = match typing {
                ColumnTyping::Native => kusto_type_to_arrow(&col.data_type),
                ColumnTyping::Text => DataType::Utf8,
            };
            Field::new(&col.name, data_type, true)
        })
        .collect();
    Schema::new(fields)
}
