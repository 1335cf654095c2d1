//! CSV upload reader producing [`RawRow`]s.

use super::row_parser::{RawRow, RawValue};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads a headed CSV document. Cells that parse as a finite number become
/// [`RawValue::Number`]; blank cells are left out of the row.
pub fn load_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.is_empty() {
        return Err(Error::Ingest("File has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let columns: Vec<(String, RawValue)> = headers
            .iter()
            .zip(record.iter())
            .filter_map(|(name, cell)| raw_value(cell).map(|value| (name.clone(), value)))
            .collect();
        if !columns.is_empty() {
            rows.push(RawRow::new(columns));
        }
    }

    Ok(rows)
}

pub fn load_rows_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>> {
    let file = File::open(path.as_ref())?;
    load_rows(file)
}

fn raw_value(cell: &str) -> Option<RawValue> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    match cell.parse::<f64>() {
        Ok(number) if number.is_finite() => Some(RawValue::Number(number)),
        _ => Some(RawValue::Text(cell.to_string())),
    }
}
