//! Table projection
//!
//! Turns raw rows and column names into a keyed, render-ready table model:
//! each column carries its inferred descriptor plus a comparator and a
//! display formatter, and each row becomes a keyed record with the two
//! storage-shape fixes applied (numeric-as-string flagged, categorical
//! numbers coerced to strings). A trailing synthetic `index` column allows
//! stable re-sorting back to insertion order.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::infer::{infer_column, ColType, ColumnDescriptor, DateMapper, VariableType};
use crate::sanitize::{sanitize_columns, sanitize_data};
use crate::value::{SimpleType, Value};

/// How a column sorts, decided from the first row's storage shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKind {
    /// Plain numeric subtraction.
    Numeric,
    /// Values are numeric strings; compare after coercion.
    NumericString,
    /// Lexical comparison of the string form.
    Lexical,
}

/// A render-ready column: inferred descriptor plus sort/format metadata.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    /// Display title (same as the key).
    pub title: String,
    /// Cell lookup key in [`TableRow`].
    pub key: String,
    /// Inferred type metadata; `None` when the column was all nulls, in
    /// which case it must be excluded from axis candidates.
    pub descriptor: Option<ColumnDescriptor>,
    pub sort: SortKind,
    /// Inferred numeric but stored as strings: displayed as-is, flagged for
    /// consumers that need the raw text.
    pub numeric_as_string: bool,
    /// Numeric storage but categorical role (e.g. a numeric id): cell values
    /// are coerced to strings at row-build time.
    pub categorical_as_number: bool,
}

impl TableColumn {
    /// Compare two rows by this column.
    pub fn compare(&self, a: &TableRow, b: &TableRow) -> Ordering {
        let left = a.get(&self.key);
        let right = b.get(&self.key);
        match self.sort {
            SortKind::Numeric | SortKind::NumericString => {
                let l = left.and_then(Value::cast_f64).unwrap_or(f64::NAN);
                let r = right.and_then(Value::cast_f64).unwrap_or(f64::NAN);
                l.total_cmp(&r)
            }
            SortKind::Lexical => {
                let l = left.map(Value::to_key_string).unwrap_or_default();
                let r = right.map(Value::to_key_string).unwrap_or_default();
                l.cmp(&r)
            }
        }
    }

    /// Format a cell for display: locale-grouped numbers for numeric
    /// non-date values (years must not become "2,020"), raw passthrough
    /// otherwise. Nulls render empty.
    pub fn render(&self, value: &Value) -> String {
        if value.is_null() {
            return String::new();
        }
        let is_date = self.descriptor.as_ref().is_some_and(ColumnDescriptor::is_date);
        match value.cast_f64() {
            Some(n) if !is_date && !matches!(value, Value::Bool(_)) => format_locale(n),
            _ => value.to_key_string(),
        }
    }
}

/// A keyed record derived 1:1 from a raw row. The row ordinal is carried
/// both as `key` and as an `index` cell so the synthetic index column can
/// address it like any other column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub key: usize,
    pub cells: HashMap<String, Value>,
}

impl TableRow {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.cells.get(key)
    }
}

/// Render-ready table model.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableModel {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

/// Group an integer-part with thousands separators, keeping up to three
/// fraction digits (trailing zeros trimmed).
fn format_locale(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let formatted = format!("{:.3}", n.abs());
    let (digits, frac) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), ""));

    let mut out = String::with_capacity(formatted.len() + digits.len() / 3 + 1);
    if n < 0.0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    let frac = frac.trim_end_matches('0');
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn sort_kind(first_row: Option<&Vec<Value>>, col_idx: usize) -> SortKind {
    match first_row.and_then(|row| row.get(col_idx)) {
        Some(Value::Number(_)) => SortKind::Numeric,
        Some(v) if v.cast_f64().is_some() => SortKind::NumericString,
        _ => SortKind::Lexical,
    }
}

/// Project raw data and column names into a table model.
///
/// Sanitizes both inputs, infers a descriptor per column, applies the
/// storage-shape fixes at row-build time, and appends the implicit `index`
/// column. Empty or invalid input yields an empty model.
pub fn project(data: &serde_json::Value, columns: &serde_json::Value) -> TableModel {
    let names = sanitize_columns(columns);
    let raw_rows = sanitize_data(data, names.len());
    project_rows(&raw_rows, &names)
}

/// Projection over already-sanitized rows and names.
pub fn project_rows(raw_rows: &[Vec<Value>], names: &[String]) -> TableModel {
    if names.is_empty() || raw_rows.is_empty() {
        return TableModel::default();
    }

    let mut table_columns: Vec<TableColumn> = Vec::with_capacity(names.len() + 1);
    for (i, name) in names.iter().enumerate() {
        let descriptor = infer_column(raw_rows, i, name);
        let numeric_as_string = descriptor
            .as_ref()
            .is_some_and(|d| d.numeric && d.simple_type_of == SimpleType::String);
        let categorical_as_number = descriptor.as_ref().is_some_and(|d| {
            d.simple_type_of == SimpleType::Number && d.variable_type == VariableType::Categorical
        });
        table_columns.push(TableColumn {
            title: name.clone(),
            key: name.clone(),
            descriptor,
            sort: sort_kind(raw_rows.first(), i),
            numeric_as_string,
            categorical_as_number,
        });
    }

    let rows: Vec<TableRow> = raw_rows
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let mut cells: HashMap<String, Value> = HashMap::with_capacity(names.len() + 1);
            cells.insert("index".to_string(), Value::Number(i as f64));
            for (j, name) in names.iter().enumerate() {
                let value = raw.get(j).cloned().unwrap_or(Value::Null);
                let value = if table_columns[j].categorical_as_number {
                    Value::String(value.to_key_string())
                } else {
                    value
                };
                cells.insert(name.clone(), value);
            }
            TableRow { key: i, cells }
        })
        .collect();

    table_columns.push(index_column(rows.len()));

    TableModel {
        columns: table_columns,
        rows,
    }
}

/// The implicit trailing ordinal column, used to restore insertion order
/// after interactive sorts.
fn index_column(row_count: usize) -> TableColumn {
    TableColumn {
        title: "index".to_string(),
        key: "index".to_string(),
        descriptor: Some(ColumnDescriptor {
            key: "index".to_string(),
            col_type: ColType::Integer,
            variable_type: VariableType::Quantitative,
            numeric: true,
            simple_type_of: SimpleType::Number,
            parse_format: None,
            date_type: None,
            date_to_unix: DateMapper::Identity,
            mean: Some((row_count as f64 + 1.0) / 2.0),
        }),
        sort: SortKind::Numeric,
        numeric_as_string: false,
        categorical_as_number: false,
    }
}
