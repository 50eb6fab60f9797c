//! Date heuristics for schema-less columns
//!
//! Result sets carry no schema, so whether a column is a time dimension has
//! to be guessed from one representative sample and the column's name. False
//! positives are an accepted trade-off: a numeric `year` column becomes a
//! date axis because upstream result columns are conventionally named.

use chrono::{Datelike, Month, NaiveDate, NaiveDateTime, Utc, Weekday};

use crate::value::Value;

/// Formats a sample must strictly match to count as a calendar value.
/// Month-only formats are padded to a full date before parsing.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d"];
const MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y-%b"];

/// Which calendar granularity a column name implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateType {
    Year,
    Month,
    Date,
    Week,
}

impl std::fmt::Display for DateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DateType::Year => "year",
            DateType::Month => "month",
            DateType::Date => "date",
            DateType::Week => "week",
        };
        write!(f, "{}", s)
    }
}

/// Pure value-to-ordinal-time mapping, encoded as data rather than a closure
/// so descriptors stay cloneable and comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateMapper {
    /// Non-date columns: the numeric cast of the value itself.
    #[default]
    Identity,
    /// Value is an ISO week number (1-52) within the current year.
    WeekOfYear,
    /// Value is a four-digit year, mapped to January 1 of that year.
    YearStart,
    /// Value is a 1- or 2-digit month number within the current year.
    MonthNumber,
    /// Value is a month name within the current year.
    MonthName { abbreviated: bool },
    /// Value is handed to the general format chain.
    Auto,
}

impl DateMapper {
    /// Map a raw value to unix seconds. Total: anything unparseable falls
    /// back to the numeric cast of the value (or 0).
    pub fn to_unix(&self, value: &Value) -> f64 {
        self.try_to_unix(value)
            .or_else(|| value.cast_f64())
            .unwrap_or(0.0)
    }

    /// Map a composite label (always a string at the chart layer) to unix
    /// seconds for chronological ordering.
    pub fn label_to_unix(&self, label: &str) -> f64 {
        self.to_unix(&Value::String(label.to_string()))
    }

    fn try_to_unix(&self, value: &Value) -> Option<f64> {
        let date = match self {
            DateMapper::Identity => return None,
            DateMapper::WeekOfYear => {
                let week = value.cast_f64()? as u32;
                NaiveDate::from_isoywd_opt(current_year(), week, Weekday::Mon)?
            }
            DateMapper::YearStart => {
                let year = value.cast_f64()? as i32;
                NaiveDate::from_ymd_opt(year, 1, 1)?
            }
            DateMapper::MonthNumber => {
                let month = value.cast_f64()? as u32;
                NaiveDate::from_ymd_opt(current_year(), month, 1)?
            }
            DateMapper::MonthName { .. } => {
                let name = value.to_key_string();
                let month = name.parse::<Month>().ok()?;
                NaiveDate::from_ymd_opt(current_year(), month.number_from_month(), 1)?
            }
            DateMapper::Auto => return parse_plain_date(&value.to_key_string()).map(unix_seconds),
        };
        date.and_hms_opt(0, 0, 0).map(unix_seconds)
    }
}

/// Outcome of the date heuristics for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct DateCheck {
    pub is_date: bool,
    pub date_type: Option<DateType>,
    pub parse_format: Option<&'static str>,
    pub mapper: DateMapper,
}

impl DateCheck {
    fn not_a_date() -> Self {
        DateCheck {
            is_date: false,
            date_type: None,
            parse_format: None,
            mapper: DateMapper::Identity,
        }
    }
}

/// Decide whether a column is a date/time dimension.
///
/// A column is a date if the sample strictly matches one of the calendar
/// formats, or the column name contains `year`, `month`, `date` or `week`
/// (case-insensitive). The granularity is resolved by an ordered priority
/// list with early exit: year > month > date > week. The `rows`/`col_idx`
/// pair is only consulted for month columns, whose storage shape decides
/// the parse strategy.
pub fn classify(sample: &Value, col_name: &str, rows: &[Vec<Value>], col_idx: usize) -> DateCheck {
    let name = col_name.to_ascii_lowercase();

    let date_type = if name.contains("year") {
        Some(DateType::Year)
    } else if name.contains("month") {
        Some(DateType::Month)
    } else if name.contains("date") {
        Some(DateType::Date)
    } else if name.contains("week") {
        Some(DateType::Week)
    } else {
        None
    };

    let format_match = matches!(sample, Value::String(s) if parse_plain_date(s).is_some());
    if !format_match && date_type.is_none() {
        return DateCheck::not_a_date();
    }

    let (parse_format, mapper) = match date_type {
        Some(DateType::Week) => (Some("%V-%Y"), DateMapper::WeekOfYear),
        Some(DateType::Year) => (Some("%m-%Y"), DateMapper::YearStart),
        Some(DateType::Month) => month_strategy(rows, col_idx),
        Some(DateType::Date) => (None, DateMapper::Auto),
        // Strict format match with no name hint: the column is treated as a
        // date for classification, but no parse strategy is attached.
        None => (None, DateMapper::Identity),
    };

    DateCheck {
        is_date: true,
        date_type,
        parse_format,
        mapper,
    }
}

/// Month columns can hold month numbers or month names; the first non-null
/// row decides which, and name length decides full vs abbreviated.
fn month_strategy(rows: &[Vec<Value>], col_idx: usize) -> (Option<&'static str>, DateMapper) {
    for row in rows {
        let Some(val) = row.get(col_idx) else { continue };
        if val.is_null() {
            continue;
        }

        if matches!(val, Value::Number(_)) {
            return (Some("%m-%Y"), DateMapper::MonthNumber);
        }
        let text = val.to_key_string();
        if text.chars().any(|c| c.is_ascii_alphabetic()) {
            return if text.len() > 3 {
                (Some("%B"), DateMapper::MonthName { abbreviated: false })
            } else {
                (Some("%b"), DateMapper::MonthName { abbreviated: true })
            };
        }
        // Zero-padded numeric month as a string.
        return (Some("%m-%Y"), DateMapper::MonthNumber);
    }
    (Some("%m-%Y"), DateMapper::MonthNumber)
}

/// Parse a string against the fixed calendar format chain.
pub(crate) fn parse_plain_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    // Month-only inputs are padded to the first of the month.
    for fmt in MONTH_FORMATS {
        let padded = format!("{}-01", s);
        let padded_fmt = format!("{}-%d", fmt);
        if let Ok(d) = NaiveDate::parse_from_str(&padded, &padded_fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn unix_seconds(dt: NaiveDateTime) -> f64 {
    dt.and_utc().timestamp() as f64
}

fn current_year() -> i32 {
    Utc::now().year()
}
