//! CSV export
//!
//! Write-only serialization of a projected table. The inverse (parsing) is
//! deliberately not implemented.

use csv::{QuoteStyle, WriterBuilder};

use crate::table::TableRow;
use crate::Result;

/// Serialize rows into quoted comma-separated text with a header row.
/// Cells are looked up by column name; missing cells serialize empty.
pub fn to_csv(rows: &[TableRow], column_names: &[String]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(column_names)?;
    for row in rows {
        let record: Vec<String> = column_names
            .iter()
            .map(|name| row.get(name).map(|v| v.to_key_string()).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| crate::VizError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}
