/*!
# vizprep - result-set shape inference and chart aggregation

Turns untyped rectangular query results (column name strings plus row
arrays) into render-ready table and chart models, without any schema
metadata to lean on.

## Example

```rust
use vizprep::{axis::AxisState, chart, RawResultSet};

let response = serde_json::json!({
    "columns": ["year", "value_a"],
    "data": [[2020, 10], [2020, 5], [2021, 7]],
});
let model = RawResultSet::from_json(&response).project();
let inputs = chart::prepare(&model.rows, &model.columns);

let mut state = AxisState::new();
let axis = state.activate(&inputs.rows, &[&inputs.date_columns[0]]);
let config = chart::create_chart_config(
    &inputs.rows,
    &inputs.date_columns,
    &inputs.y_axis_columns[..1],
    &state.resolve_selected(&axis),
    true,
);
assert_eq!(config.chart_labels, vec!["2020", "2021"]);
```

## Architecture

The pipeline is a chain of pure transformations:

raw `columns`/`data` → [`sanitize`] → [`infer`] (per column) →
[`table`] (keyed table model) / [`axis`] (selection options) →
[`chart`] (aggregated series) → [`export`] (CSV, write-only)

Every step is synchronous, side-effect-free, and total: malformed input
degrades to an empty structure instead of failing the enclosing render.

## Core Components

- [`value`] - tagged scalar cell model and numeric coercions
- [`result_set`] - input contract with opaque passthrough fields
- [`sanitize`] - null/percent/rounding normalization
- [`infer`] - column type and role inference, date heuristics
- [`table`] - keyed, sortable, renderable table projection
- [`axis`] - selectable axis domains and the large-domain sentinel policy
- [`chart`] - additive group-sum aggregation into chart series
- [`export`] - CSV serialization
*/

pub mod axis;
pub mod chart;
pub mod export;
pub mod infer;
pub mod result_set;
pub mod sanitize;
pub mod table;
pub mod value;

// Re-export key types for convenience
pub use axis::{AxisOption, AxisState};
pub use chart::{ChartConfig, ChartKind, ChartSeries, RenderOptions};
pub use infer::{ColType, ColumnDescriptor, VariableType};
pub use infer::date::{DateMapper, DateType};
pub use result_set::RawResultSet;
pub use table::{TableColumn, TableModel, TableRow};
pub use value::{SimpleType, Value};

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum VizError {
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output was not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, VizError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Full pipeline over a conventionally named date column: raw response
    /// → table model → chart inputs → chart config.
    #[test]
    fn test_end_to_end_year_scenario() {
        init_logging();
        let response = json!({
            "columns": ["year", "value_a"],
            "data": [[2020, 10], [2020, 5], [2021, 7]],
            "generatedSql": "SELECT year, value_a FROM sales"
        });
        let result_set = RawResultSet::from_json(&response);
        assert_eq!(
            result_set.generated_sql(),
            Some("SELECT year, value_a FROM sales")
        );
        let model = result_set.project();

        let year = model.columns[0].descriptor.as_ref().unwrap();
        assert_eq!(year.col_type, ColType::Date);
        assert_eq!(year.variable_type, VariableType::Categorical);
        assert_eq!(year.date_type, Some(DateType::Year));

        let value_a = model.columns[1].descriptor.as_ref().unwrap();
        assert_eq!(value_a.col_type, ColType::Integer);
        assert_eq!(value_a.variable_type, VariableType::Quantitative);

        let inputs = chart::prepare(&model.rows, &model.columns);
        assert_eq!(inputs.date_columns[0].key, "year");

        let mut state = AxisState::new();
        let axis = state.activate(&inputs.rows, &[&inputs.date_columns[0]]);
        let config = chart::create_chart_config(
            &inputs.rows,
            &inputs.date_columns,
            &inputs.y_axis_columns[..1],
            &state.resolve_selected(&axis),
            true,
        );
        assert_eq!(config.chart_labels, vec!["2020", "2021"]);
        let sums: Vec<f64> = config.chart_data[0].data.iter().map(|p| p.y).collect();
        assert_eq!(sums, vec![15.0, 7.0]);
    }

    /// Numeric identifier columns never become measures, and their distinct
    /// axis values are strings.
    #[test]
    fn test_end_to_end_user_id_scenario() {
        let response = json!({
            "columns": ["user_id", "visits"],
            "data": [[100, 3], [200, 5], [100, 2]]
        });
        let model = RawResultSet::from_json(&response).project();

        let id = model.columns[0].descriptor.as_ref().unwrap();
        assert_eq!(id.col_type, ColType::String);
        assert_eq!(id.variable_type, VariableType::Categorical);
        assert!(!id.numeric);

        let values = axis::column_values(&model.rows, &["user_id".to_string()]);
        assert_eq!(values, vec!["100", "200"]);
    }

    /// A 500-value domain flips the sentinel to select-all and starts with
    /// a single concrete selection.
    #[test]
    fn test_end_to_end_large_domain_scenario() {
        init_logging();
        let data: Vec<serde_json::Value> =
            (0..500).map(|i| json!([format!("cat{i}"), i])).collect();
        let response = json!({"columns": ["category", "n"], "data": data});
        let model = RawResultSet::from_json(&response).project();
        let inputs = chart::prepare(&model.rows, &model.columns);

        let mut state = AxisState::new();
        let category = inputs
            .x_axis_columns
            .iter()
            .find(|c| c.key == "category")
            .unwrap();
        let axis = state.activate(&inputs.rows, &[category]);

        let options = state.options(&axis);
        assert_eq!(options[0], AxisOption::new("Select All", axis::SELECT_ALL));
        assert_eq!(options.len(), 501);
        assert_eq!(state.selected(&axis).len(), 1);
        assert_eq!(state.resolve_selected(&axis).len(), 1);
    }

    /// Percent cells survive the whole chain with the sign stripped and no
    /// rescaling, and the table exports as fully quoted CSV.
    #[test]
    fn test_end_to_end_percent_and_csv() {
        let response = json!({
            "columns": ["region", "share"],
            "data": [["north", "42%"], ["south", "58%"]]
        });
        let model = RawResultSet::from_json(&response).project();
        let inputs = chart::prepare(&model.rows, &model.columns);
        assert_eq!(inputs.rows[0].get("share"), Some(&Value::Number(42.0)));

        let names: Vec<String> = vec!["region".into(), "share".into()];
        let csv = export::to_csv(&model.rows, &names).unwrap();
        assert!(csv.starts_with("\"region\",\"share\""));
        assert!(csv.contains("\"north\",\"42%\""));
    }
}
