//! Raw result-set input contract
//!
//! The upstream query layer hands over an object with `columns` and `data`
//! plus passthrough fields (`generatedSql`, `question`, identifiers) that
//! this core treats as opaque and only round-trips. Construction is total:
//! malformed shapes degrade to empty sequences, never errors.

use serde::Serialize;

use crate::sanitize::{sanitize_columns, sanitize_data};
use crate::table::{self, TableModel};
use crate::value::Value;

/// An untyped rectangular result set: unique column names and positionally
/// aligned rows. Rows violating the column count never survive construction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawResultSet {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Value>>,
    /// Opaque passthrough fields from the upstream layer.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawResultSet {
    /// Build a result set from an upstream JSON response. Anything that is
    /// not `columns` or `data` is preserved verbatim in `extra`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let null = serde_json::Value::Null;
        let columns = sanitize_columns(value.get("columns").unwrap_or(&null));
        let data = sanitize_data(value.get("data").unwrap_or(&null), columns.len());

        let extra = value
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter(|(k, _)| k.as_str() != "columns" && k.as_str() != "data")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();

        RawResultSet {
            columns,
            data,
            extra,
        }
    }

    /// The generated SQL passthrough field, when the upstream layer sent it.
    pub fn generated_sql(&self) -> Option<&str> {
        self.extra.get("generatedSql").and_then(|v| v.as_str())
    }

    /// The original natural-language question, when present.
    pub fn question(&self) -> Option<&str> {
        self.extra.get("question").and_then(|v| v.as_str())
    }

    /// Project this result set into a render-ready table model.
    pub fn project(&self) -> TableModel {
        table::project_rows(&self.data, &self.columns)
    }
}
