//! Chart aggregation
//!
//! Filters, groups, sums, and orders keyed rows into a labeled multi-series
//! chart structure. Aggregation is always additive (duplicate x occurrences
//! are summed, never averaged or overwritten) and ordering is either
//! biggest-first (by the first y column) or chronological (by the x
//! column's date mapping). O(n) in rows plus O(k log k) in distinct labels.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::axis::{join_values, AxisOption};
use crate::infer::date::parse_plain_date;
use crate::infer::{ColType, DateMapper, VariableType};
use crate::sanitize::strip_percent_values;
use crate::table::{TableColumn, TableRow};
use crate::value::Value;

/// Deterministic series palette, assigned by series index.
pub const CHART_COLORS: &[&str] = &[
    "#2B59FF", "#FF5C85", "#FFB020", "#00C292", "#9B59B6", "#FF8A3D", "#12B5CB", "#7A6FF0",
];

/// One point in a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x_label: String,
    pub y: f64,
}

/// One series per selected y-axis column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub data: Vec<ChartPoint>,
    pub background_color: String,
}

/// Chart-ready structure shared by all chart kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartConfig {
    /// Ordered distinct x-axis category labels, shared across series.
    pub chart_labels: Vec<String>,
    pub chart_data: Vec<ChartSeries>,
}

impl ChartConfig {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Axis candidates and value domains derived from a projected table,
/// plus a percent-stripped working copy of the rows.
#[derive(Debug, Clone, Default)]
pub struct ChartInputs {
    /// Every typed column is an x-axis candidate.
    pub x_axis_columns: Vec<TableColumn>,
    /// Categorical non-date columns.
    pub categorical_columns: Vec<TableColumn>,
    /// Quantitative non-date columns: the y-axis candidates.
    pub y_axis_columns: Vec<TableColumn>,
    /// Date columns (preferred default x axis).
    pub date_columns: Vec<TableColumn>,
    /// Distinct value domain per x-axis candidate key.
    pub x_axis_column_values: HashMap<String, Vec<String>>,
    pub rows: Vec<TableRow>,
}

/// Partition projected columns into axis candidates and prepare the rows
/// for charting. Columns without a descriptor (all-null) are unplottable
/// and excluded from every candidate list.
pub fn prepare(rows: &[TableRow], columns: &[TableColumn]) -> ChartInputs {
    fn is_date(c: &TableColumn) -> bool {
        c.descriptor.as_ref().is_some_and(|d| d.col_type == ColType::Date)
    }
    fn role(c: &TableColumn) -> Option<VariableType> {
        c.descriptor.as_ref().map(|d| d.variable_type)
    }

    let date_columns: Vec<TableColumn> =
        columns.iter().filter(|c| is_date(c)).cloned().collect();
    let categorical_columns: Vec<TableColumn> = columns
        .iter()
        .filter(|c| role(c) == Some(VariableType::Categorical) && !is_date(c))
        .cloned()
        .collect();
    let y_axis_columns: Vec<TableColumn> = columns
        .iter()
        .filter(|c| role(c) == Some(VariableType::Quantitative) && !is_date(c))
        .cloned()
        .collect();
    let x_axis_columns: Vec<TableColumn> =
        columns.iter().filter(|c| c.descriptor.is_some()).cloned().collect();

    let x_axis_column_values = x_axis_columns
        .iter()
        .map(|c| {
            (
                c.key.clone(),
                crate::axis::column_values(rows, std::slice::from_ref(&c.key)),
            )
        })
        .collect();

    let mut rows = rows.to_vec();
    strip_percent_values(&mut rows);

    ChartInputs {
        x_axis_columns,
        categorical_columns,
        y_axis_columns,
        date_columns,
        x_axis_column_values,
        rows,
    }
}

/// Aggregate rows into a chart configuration.
///
/// Rows are keyed by the composite label of the x-axis columns; rows whose
/// label is not among the selected labels are dropped; the survivors are
/// grouped by label with every y column summed additively. `chart_labels`
/// contains exactly the distinct labels present after filtering, ordered
/// descending by the first y column's sum, or ascending by the x column's
/// date mapping when `x_axis_is_date`.
pub fn create_chart_config(
    rows: &[TableRow],
    x_axis: &[TableColumn],
    y_axis: &[TableColumn],
    selected: &[AxisOption],
    x_axis_is_date: bool,
) -> ChartConfig {
    if x_axis.is_empty() || y_axis.is_empty() || selected.is_empty() || rows.is_empty() {
        return ChartConfig::empty();
    }

    let selected_labels: HashSet<&str> = selected.iter().map(|o| o.label.as_str()).collect();
    let x_keys: Vec<&str> = x_axis.iter().map(|c| c.key.as_str()).collect();

    // Group surviving rows by composite label, summing every y column.
    // Cells that fail numeric coercion are skipped, not zeroed into a sum.
    let mut sums: HashMap<String, Vec<f64>> = HashMap::new();
    let mut label_order: Vec<String> = Vec::new();
    for row in rows {
        let label = join_values(x_keys.iter().map(|k| row.get(k).unwrap_or(&Value::Null)));
        if !selected_labels.contains(label.as_str()) {
            continue;
        }
        let entry = sums.entry(label.clone()).or_insert_with(|| {
            label_order.push(label.clone());
            vec![0.0; y_axis.len()]
        });
        for (i, col) in y_axis.iter().enumerate() {
            if let Some(v) = row.get(&col.key).and_then(Value::coerce_f64) {
                entry[i] += v;
            }
        }
    }

    let mut chart_labels = label_order;
    if x_axis_is_date {
        let mapper = x_axis[0]
            .descriptor
            .as_ref()
            .map(|d| d.date_to_unix)
            .unwrap_or(DateMapper::Identity);
        chart_labels.sort_by(|a, b| {
            mapper
                .label_to_unix(a)
                .total_cmp(&mapper.label_to_unix(b))
        });
    } else {
        let first_sum = |label: &str| sums.get(label).map(|v| v[0]).unwrap_or(0.0);
        chart_labels.sort_by(|a, b| first_sum(b).total_cmp(&first_sum(a)));
    }

    let chart_data = y_axis
        .iter()
        .enumerate()
        .map(|(i, col)| ChartSeries {
            label: col.key.clone(),
            data: chart_labels
                .iter()
                .map(|label| ChartPoint {
                    x_label: label.clone(),
                    y: sums.get(label).map(|v| v[i]).unwrap_or(0.0),
                })
                .collect(),
            background_color: CHART_COLORS[i % CHART_COLORS.len()].to_string(),
        })
        .collect();

    ChartConfig {
        chart_labels,
        chart_data,
    }
}

/// Chart kind chosen by the user; UI state, never inferred from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
    Line,
}

/// Per-render chart configuration handed to the rendering collaborator.
/// This core produces data and formatting callbacks only; it never touches
/// shared rendering state.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub title: String,
    pub kind: ChartKind,
    pub x_axis_is_date: bool,
}

impl RenderOptions {
    /// Format an axis tick or tooltip label: date labels become `D MMM 'YY`,
    /// everything else passes through.
    pub fn format_label(&self, label: &str) -> String {
        if self.x_axis_is_date {
            format_time_label(label)
        } else {
            label.to_string()
        }
    }
}

/// Render a strict-format date label as e.g. `30 Jun '24`; non-date labels
/// are returned title-cased input unchanged in content.
fn format_time_label(label: &str) -> String {
    let titled = title_case(label);
    match parse_plain_date(&titled) {
        Some(dt) => dt.format("%-d %b '%y").to_string(),
        None => titled,
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
