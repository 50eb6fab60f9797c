//! Result-set sanitization
//!
//! Normalizes raw JSON-shaped input before inference and again (in keyed
//! form) before charting. Malformed input is never an error here: non-array
//! structures become empty sequences and bad rows are dropped, not repaired.

use crate::infer::{ColType, ColumnDescriptor};
use crate::table::TableRow;
use crate::value::Value;

/// Stringify raw column names. Non-array input yields an empty sequence.
pub fn sanitize_columns(columns: &serde_json::Value) -> Vec<String> {
    let Some(arr) = columns.as_array() else {
        return Vec::new();
    };
    arr.iter()
        .map(|c| match c {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

/// Normalize raw row data. Non-array input yields an empty sequence;
/// non-array rows, rows whose every cell is null, and rows that do not
/// match the column count are dropped.
pub fn sanitize_data(data: &serde_json::Value, width: usize) -> Vec<Vec<Value>> {
    let Some(arr) = data.as_array() else {
        return Vec::new();
    };
    arr.iter()
        .filter_map(|row| {
            let cells: Vec<Value> = row.as_array()?.iter().map(Value::from).collect();
            if cells.len() != width {
                log::debug!(
                    "dropping row with {} cells (expected {})",
                    cells.len(),
                    width
                );
                return None;
            }
            if cells.iter().all(Value::is_null) {
                return None;
            }
            Some(cells)
        })
        .collect()
}

/// Chart-mode normalization: rewrite every string cell ending in `%` to its
/// numeric value in place. The percent sign is stripped with no division by
/// 100 ("42%" becomes 42, not 0.42); the upstream contract treats percent
/// values as already scaled. Row count never changes, and applying this
/// twice is the same as applying it once.
pub fn strip_percent_values(rows: &mut [TableRow]) {
    for row in rows {
        for value in row.cells.values_mut() {
            let Value::String(s) = value else { continue };
            if !s.ends_with('%') {
                continue;
            }
            // Unparseable percent strings are left untouched.
            if let Ok(n) = s[..s.len() - 1].trim().parse::<f64>() {
                *value = Value::Number(n);
            }
        }
    }
}

/// Round decimal-typed columns over a copied row set: to 2 places when the
/// magnitude exceeds 0.01, else to 6 places (tiny values would otherwise
/// round to zero). Values that fail numeric coercion are left untouched.
pub fn round_columns(rows: &[TableRow], columns: &[ColumnDescriptor]) -> Vec<TableRow> {
    let decimal_keys: Vec<&str> = columns
        .iter()
        .filter(|c| c.col_type == ColType::Decimal)
        .map(|c| c.key.as_str())
        .collect();

    let mut rounded = rows.to_vec();
    for row in &mut rounded {
        for key in &decimal_keys {
            let Some(value) = row.cells.get_mut(*key) else {
                continue;
            };
            if let Some(x) = value.coerce_f64() {
                let r = if x.abs() > 1e-2 {
                    (x * 1e2).round() / 1e2
                } else {
                    (x * 1e6).round() / 1e6
                };
                *value = Value::Number(r);
            }
        }
    }
    rounded
}
