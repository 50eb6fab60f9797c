//! Scalar value model for untyped result-set cells
//!
//! Result sets arrive without any schema, so every cell is one of four
//! scalar shapes. `Value` makes that explicit as a tagged enum while keeping
//! the JSON representation untagged, so `[2020, "north", 1.5, null]` rows
//! deserialize directly.

use serde::{Deserialize, Serialize};

/// A single result-set cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// Raw storage type of a cell, as observed on the first non-null sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleType {
    Number,
    String,
    Boolean,
    Null,
}

impl std::fmt::Display for SimpleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SimpleType::Number => "number",
            SimpleType::String => "string",
            SimpleType::Boolean => "boolean",
            SimpleType::Null => "null",
        };
        write!(f, "{}", s)
    }
}

/// Format a number for display keys (integral floats print without a fraction).
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

impl Value {
    /// Build a `Value` from arbitrary JSON. Arrays and objects have no
    /// scalar meaning in a rectangular result set and are stringified.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Raw storage type of this cell.
    pub fn simple_type(&self) -> SimpleType {
        match self {
            Value::Null => SimpleType::Null,
            Value::Bool(_) => SimpleType::Boolean,
            Value::Number(_) => SimpleType::Number,
            Value::String(_) => SimpleType::String,
        }
    }

    /// Total numeric cast: nulls and empty strings cast to 0, booleans to
    /// 0/1, unparseable strings to `None`. Used by comparators and display
    /// formatting, where a null must still land somewhere in the order.
    pub fn cast_f64(&self) -> Option<f64> {
        match self {
            Value::Null => Some(0.0),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Some(*n),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
        }
    }

    /// Aggregation coercion: like [`cast_f64`](Self::cast_f64) but nulls and
    /// unparseable strings are skipped entirely, so they never pull a mean or
    /// sum towards zero.
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Convert to a string key for grouping and display.
    pub fn to_key_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Value::from_json(&serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from_json(&serde_json::json!(true)), Value::Bool(true));
        assert_eq!(Value::from_json(&serde_json::json!(2.5)), Value::Number(2.5));
        assert_eq!(
            Value::from_json(&serde_json::json!("north")),
            Value::String("north".to_string())
        );
    }

    #[test]
    fn test_from_json_non_scalar_is_stringified() {
        let val = Value::from_json(&serde_json::json!([1, 2]));
        assert_eq!(val, Value::String("[1,2]".to_string()));
    }

    #[test]
    fn test_untagged_row_deserialization() {
        let row: Vec<Value> = serde_json::from_str(r#"[2020, "north", 1.5, null, true]"#).unwrap();
        assert_eq!(
            row,
            vec![
                Value::Number(2020.0),
                Value::String("north".to_string()),
                Value::Number(1.5),
                Value::Null,
                Value::Bool(true),
            ]
        );
    }

    #[test]
    fn test_cast_f64() {
        assert_eq!(Value::Null.cast_f64(), Some(0.0));
        assert_eq!(Value::Bool(true).cast_f64(), Some(1.0));
        assert_eq!(Value::Number(4.5).cast_f64(), Some(4.5));
        assert_eq!(Value::from("42").cast_f64(), Some(42.0));
        assert_eq!(Value::from("").cast_f64(), Some(0.0));
        assert_eq!(Value::from("north").cast_f64(), None);
    }

    #[test]
    fn test_coerce_f64_skips_nulls() {
        assert_eq!(Value::Null.coerce_f64(), None);
        assert_eq!(Value::from("42%").coerce_f64(), None);
        assert_eq!(Value::from("3.25").coerce_f64(), Some(3.25));
    }

    #[test]
    fn test_key_string_integral_float() {
        assert_eq!(Value::Number(2020.0).to_key_string(), "2020");
        assert_eq!(Value::Number(2.5).to_key_string(), "2.5");
        assert_eq!(Value::Null.to_key_string(), "null");
    }

    #[test]
    fn test_simple_type() {
        assert_eq!(Value::Number(1.0).simple_type(), SimpleType::Number);
        assert_eq!(Value::from("a").simple_type(), SimpleType::String);
        assert_eq!(Value::Bool(false).simple_type(), SimpleType::Boolean);
        assert_eq!(Value::Null.simple_type(), SimpleType::Null);
    }
}
