//! Column type inference
//!
//! Classifies a column's storage type and statistical role from its first
//! non-null value. Later rows are assumed to share the same shape; inspecting
//! a single sample is a deliberate approximation, not an oversight, and keeps
//! inference O(1) per column in the common case.
//!
//! Decision order:
//! 1. identifier-named columns are forced to string/categorical,
//! 2. date heuristics,
//! 3. numeric pattern with a decimal point → decimal,
//! 4. numeric or exponential pattern → integer,
//! 5. fall back to the sample's storage type.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::value::{SimpleType, Value};

pub mod date;

pub use date::{classify, DateCheck, DateMapper, DateType};

/// Inferred storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColType {
    String,
    Integer,
    Decimal,
    Date,
    Boolean,
}

impl std::fmt::Display for ColType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColType::String => "string",
            ColType::Integer => "integer",
            ColType::Decimal => "decimal",
            ColType::Date => "date",
            ColType::Boolean => "boolean",
        };
        write!(f, "{}", s)
    }
}

/// Statistical role: grouping key or summed measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Categorical,
    Quantitative,
}

/// Inferred metadata for one column.
///
/// Created fresh on every inference call from the first non-null sample and
/// discarded when the caller's data changes; never cached across result sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub key: String,
    pub col_type: ColType,
    pub variable_type: VariableType,
    pub numeric: bool,
    /// Raw storage type of the first non-null sample.
    pub simple_type_of: SimpleType,
    /// Format token used to parse date-like values, if any.
    pub parse_format: Option<String>,
    pub date_type: Option<DateType>,
    /// Value → ordinal-time mapping; identity for non-dates.
    #[serde(skip)]
    pub date_to_unix: DateMapper,
    /// Column mean, computed only for quantitative columns.
    pub mean: Option<f64>,
}

impl ColumnDescriptor {
    pub fn is_date(&self) -> bool {
        self.col_type == ColType::Date
    }
}

// Matches a valid number with an optional % suffix. Paired with the
// ends-with check so a lone "-" or "%" does not slip through.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(0|[1-9]\d*)?(\.\d+)?%?$").expect("valid regex"));
static ENDS_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d%?$").expect("valid regex"));
static EXPONENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(0|[1-9]\d*)?(\.\d+)?([eE][-+]?\d+)?$").expect("valid regex"));

/// Numeric-pattern test over the value's string form. The upstream engine
/// sometimes returns numbers as strings, so shape is tested, not storage.
fn is_number_like(value: &Value) -> bool {
    let s = value.to_key_string();
    NUMBER_RE.is_match(&s) && ENDS_NUMERIC_RE.is_match(&s)
}

fn is_exponential(value: &Value) -> bool {
    EXPONENT_RE.is_match(&value.to_key_string())
}

fn has_decimal_point(value: &Value) -> bool {
    value.to_key_string().contains('.')
}

/// Identifier-named columns must never become quantitative measures,
/// whatever their value shape.
fn is_identifier_name(name: &str) -> bool {
    name.ends_with("_id") || name.starts_with("id_") || name == "id"
}

/// Mean over the column, skipping values that fail numeric coercion.
fn column_mean(rows: &[Vec<Value>], col_idx: usize) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for row in rows {
        if let Some(v) = row.get(col_idx).and_then(Value::coerce_f64) {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Infer a column's descriptor from its first non-null value.
///
/// Returns `None` when every value in the column is null: such a column has
/// no knowable type and callers must exclude it from axis candidates.
pub fn infer_column(rows: &[Vec<Value>], col_idx: usize, col_name: &str) -> Option<ColumnDescriptor> {
    if is_identifier_name(col_name) {
        let simple_type_of = rows
            .iter()
            .filter_map(|row| row.get(col_idx))
            .find(|v| !v.is_null())
            .map(Value::simple_type)
            .unwrap_or(SimpleType::String);
        return Some(ColumnDescriptor {
            key: col_name.to_string(),
            col_type: ColType::String,
            variable_type: VariableType::Categorical,
            numeric: false,
            simple_type_of,
            parse_format: None,
            date_type: None,
            date_to_unix: DateMapper::Identity,
            mean: None,
        });
    }

    for row in rows {
        let Some(val) = row.get(col_idx) else { continue };
        if val.is_null() {
            continue;
        }

        let date_check = date::classify(val, col_name, rows, col_idx);
        let descriptor = if date_check.is_date {
            ColumnDescriptor {
                key: col_name.to_string(),
                col_type: ColType::Date,
                variable_type: VariableType::Categorical,
                numeric: false,
                simple_type_of: val.simple_type(),
                parse_format: date_check.parse_format.map(str::to_string),
                date_type: date_check.date_type,
                date_to_unix: date_check.mapper,
                mean: None,
            }
        } else if is_number_like(val) && has_decimal_point(val) {
            ColumnDescriptor {
                key: col_name.to_string(),
                col_type: ColType::Decimal,
                variable_type: VariableType::Quantitative,
                numeric: true,
                simple_type_of: val.simple_type(),
                parse_format: None,
                date_type: None,
                date_to_unix: DateMapper::Identity,
                mean: column_mean(rows, col_idx),
            }
        } else if is_number_like(val) || is_exponential(val) {
            ColumnDescriptor {
                key: col_name.to_string(),
                col_type: ColType::Integer,
                variable_type: VariableType::Quantitative,
                numeric: true,
                simple_type_of: val.simple_type(),
                parse_format: None,
                date_type: None,
                date_to_unix: DateMapper::Identity,
                mean: column_mean(rows, col_idx),
            }
        } else {
            // Fall back to the sample's native storage type.
            let (col_type, numeric) = match val.simple_type() {
                SimpleType::Number => (ColType::Integer, true),
                SimpleType::Boolean => (ColType::Boolean, false),
                _ => (ColType::String, false),
            };
            ColumnDescriptor {
                key: col_name.to_string(),
                col_type,
                variable_type: if numeric {
                    VariableType::Quantitative
                } else {
                    VariableType::Categorical
                },
                numeric,
                simple_type_of: val.simple_type(),
                parse_format: None,
                date_type: None,
                date_to_unix: DateMapper::Identity,
                mean: if numeric { column_mean(rows, col_idx) } else { None },
            }
        };
        return Some(descriptor);
    }

    // Every value was null: no descriptor.
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_of(col: &[Value]) -> Vec<Vec<Value>> {
        col.iter().map(|v| vec![v.clone()]).collect()
    }

    #[test]
    fn test_id_suffix_forces_categorical() {
        let rows = rows_of(&[Value::Number(100.0), Value::Number(200.0)]);
        let desc = infer_column(&rows, 0, "user_id").unwrap();
        assert_eq!(desc.col_type, ColType::String);
        assert_eq!(desc.variable_type, VariableType::Categorical);
        assert!(!desc.numeric);
        assert_eq!(desc.simple_type_of, SimpleType::Number);
        assert_eq!(desc.mean, None);
    }

    #[test]
    fn test_id_prefix_and_exact_name() {
        let rows = rows_of(&[Value::Number(1.0)]);
        assert_eq!(
            infer_column(&rows, 0, "id_customer").unwrap().col_type,
            ColType::String
        );
        assert_eq!(infer_column(&rows, 0, "id").unwrap().col_type, ColType::String);
        // "identity" is not an id name
        assert_eq!(
            infer_column(&rows, 0, "identity").unwrap().col_type,
            ColType::Integer
        );
    }

    #[test]
    fn test_id_column_all_null_still_yields_descriptor() {
        let rows = rows_of(&[Value::Null, Value::Null]);
        let desc = infer_column(&rows, 0, "order_id").unwrap();
        assert_eq!(desc.simple_type_of, SimpleType::String);
    }

    #[test]
    fn test_date_by_name() {
        let rows = rows_of(&[Value::Number(2020.0), Value::Number(2021.0)]);
        let desc = infer_column(&rows, 0, "year").unwrap();
        assert_eq!(desc.col_type, ColType::Date);
        assert_eq!(desc.variable_type, VariableType::Categorical);
        assert_eq!(desc.date_type, Some(DateType::Year));
        assert_eq!(desc.date_to_unix, DateMapper::YearStart);
        assert!(!desc.numeric);
    }

    #[test]
    fn test_decimal_from_number() {
        let rows = rows_of(&[Value::Number(1.5), Value::Number(2.5)]);
        let desc = infer_column(&rows, 0, "price").unwrap();
        assert_eq!(desc.col_type, ColType::Decimal);
        assert!(desc.numeric);
        assert_eq!(desc.mean, Some(2.0));
    }

    #[test]
    fn test_decimal_from_string() {
        let rows = rows_of(&[Value::from("1.5"), Value::from("2.5")]);
        let desc = infer_column(&rows, 0, "price").unwrap();
        assert_eq!(desc.col_type, ColType::Decimal);
        assert_eq!(desc.simple_type_of, SimpleType::String);
    }

    #[test]
    fn test_integer_from_number_and_string() {
        let rows = rows_of(&[Value::Number(10.0)]);
        assert_eq!(infer_column(&rows, 0, "count").unwrap().col_type, ColType::Integer);

        let rows = rows_of(&[Value::from("10")]);
        let desc = infer_column(&rows, 0, "count").unwrap();
        assert_eq!(desc.col_type, ColType::Integer);
        assert!(desc.numeric);
    }

    #[test]
    fn test_percent_string_is_numeric() {
        let rows = rows_of(&[Value::from("42%"), Value::from("58%")]);
        let desc = infer_column(&rows, 0, "share").unwrap();
        assert_eq!(desc.col_type, ColType::Integer);
        assert!(desc.numeric);
        // "42%" fails coercion, so no mean is available.
        assert_eq!(desc.mean, None);
    }

    #[test]
    fn test_exponential_notation() {
        let rows = rows_of(&[Value::from("1.5e10")]);
        let desc = infer_column(&rows, 0, "magnitude").unwrap();
        assert_eq!(desc.col_type, ColType::Integer);
        assert!(desc.numeric);
    }

    #[test]
    fn test_plain_string_fallback() {
        let rows = rows_of(&[Value::from("north"), Value::from("south")]);
        let desc = infer_column(&rows, 0, "region").unwrap();
        assert_eq!(desc.col_type, ColType::String);
        assert_eq!(desc.variable_type, VariableType::Categorical);
        assert!(!desc.numeric);
        assert_eq!(desc.mean, None);
    }

    #[test]
    fn test_boolean_fallback() {
        let rows = rows_of(&[Value::Bool(true)]);
        let desc = infer_column(&rows, 0, "active").unwrap();
        assert_eq!(desc.col_type, ColType::Boolean);
        assert_eq!(desc.variable_type, VariableType::Categorical);
    }

    #[test]
    fn test_first_non_null_wins() {
        // The first non-null sample decides, even if later rows disagree.
        let rows = rows_of(&[Value::Null, Value::from("north"), Value::Number(5.0)]);
        let desc = infer_column(&rows, 0, "mixed").unwrap();
        assert_eq!(desc.col_type, ColType::String);
    }

    #[test]
    fn test_all_null_column_has_no_descriptor() {
        let rows = rows_of(&[Value::Null, Value::Null]);
        assert!(infer_column(&rows, 0, "mystery").is_none());
    }

    #[test]
    fn test_mean_skips_uncoercible_values() {
        let rows = rows_of(&[Value::from("10"), Value::from("oops"), Value::from("20")]);
        let desc = infer_column(&rows, 0, "count").unwrap();
        assert_eq!(desc.mean, Some(15.0));
    }

    #[test]
    fn test_number_pattern_rejects_ragged_strings() {
        assert!(is_number_like(&Value::from("-12")));
        assert!(is_number_like(&Value::from("0.5")));
        assert!(is_number_like(&Value::from("42%")));
        assert!(!is_number_like(&Value::from("-")));
        assert!(!is_number_like(&Value::from("%")));
        assert!(!is_number_like(&Value::from("12a")));
        assert!(!is_number_like(&Value::from("a12")));
    }
}
