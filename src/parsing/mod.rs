//! Ingestion of uploaded demand and supply files
//!
//! - **csv_loader** - CSV text to [`RawRow`]s
//! - **row_parser** - column heuristics, rows to typed points
//! - **timestamp_parser** - ISO, spreadsheet serial and `M/D/YY H:MM` instants

pub mod csv_loader;
pub mod row_parser;
pub mod timestamp_parser;

pub use csv_loader::{load_rows, load_rows_from_path};
pub use row_parser::{RawRow, RawValue, RowParser};
pub use timestamp_parser::TimestampParser;

use crate::core::{DemandEvent, SupplyRecord};
use crate::error::Result;
use std::io::Read;

/// Reads a CSV demand upload into events.
pub fn read_demand_csv<R: Read>(parser: &RowParser, reader: R) -> Result<Vec<DemandEvent>> {
    let rows = load_rows(reader)?;
    parser.parse_demand_rows(&rows)
}

/// Reads a CSV supply upload into vehicle records.
pub fn read_supply_csv<R: Read>(parser: &RowParser, reader: R) -> Result<Vec<SupplyRecord>> {
    let rows = load_rows(reader)?;
    parser.parse_supply_rows(&rows)
}
