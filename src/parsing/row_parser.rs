//! Turns loosely-structured spreadsheet rows into typed demand and supply
//! points.
//!
//! Column lookup follows the heuristics users relied on when uploading
//! arbitrary exports: match by (partial) column name first, fall back to
//! column position. Rows that cannot be interpreted are dropped silently;
//! only a dataset with zero usable rows is an error.

use super::timestamp_parser::TimestampParser;
use crate::core::{DemandEvent, SupplyRecord};
use crate::error::{Error, Result};
use tracing::{info, warn};

/// A single non-empty cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
}

impl RawValue {
    /// Numeric cells as-is, text parsed as a float. Non-finite values are
    /// rejected.
    pub fn as_coordinate(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    fn is_blank_timestamp(&self) -> bool {
        match self {
            RawValue::Text(text) => text.is_empty(),
            RawValue::Number(n) => *n == 0.0,
        }
    }
}

/// Ordered `(column, value)` pairs of one row. Empty cells are absent, so two
/// rows of the same file may have different column counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub columns: Vec<(String, RawValue)>,
}

impl RawRow {
    pub fn new(columns: Vec<(String, RawValue)>) -> Self {
        RawRow { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn value_at(&self, index: usize) -> Option<&RawValue> {
        self.columns.get(index).map(|(_, value)| value)
    }

    /// Index of the first column whose lowercase name contains any needle.
    fn find_column(&self, needles: &[&str]) -> Option<usize> {
        self.columns.iter().position(|(name, _)| {
            let name = name.to_lowercase();
            needles.iter().any(|needle| name.contains(needle))
        })
    }

    fn names_are(&self, expected: &[&str]) -> bool {
        self.columns.len() == expected.len()
            && self.columns.iter().zip(expected).all(|((name, _), e)| name == e)
    }
}

const TIME_COLUMN: &[&str] = &["time", "date"];
const LAT_COLUMN: &[&str] = &["lat"];
const LNG_COLUMN: &[&str] = &["lng", "lon"];
const START_COLUMN: &[&str] = &["start"];
const END_COLUMN: &[&str] = &["end"];

pub struct RowParser {
    timestamps: TimestampParser,
}

impl RowParser {
    pub fn new() -> Result<Self> {
        Ok(RowParser { timestamps: TimestampParser::new()? })
    }

    pub fn timestamps(&self) -> &TimestampParser {
        &self.timestamps
    }

    /// Demand rows need timestamp, latitude and longitude columns.
    pub fn parse_demand_rows(&self, rows: &[RawRow]) -> Result<Vec<DemandEvent>> {
        let events: Vec<DemandEvent> = rows.iter().filter_map(|row| self.demand_event(row)).collect();

        if events.is_empty() {
            return Err(Error::Ingest("No valid demand events found".to_string()));
        }
        if events.len() < rows.len() {
            warn!(dropped = rows.len() - events.len(), "dropped malformed demand rows");
        }
        info!("Loaded {} demand events", events.len());
        Ok(events)
    }

    /// Supply rows need start time, end time, latitude and longitude columns.
    pub fn parse_supply_rows(&self, rows: &[RawRow]) -> Result<Vec<SupplyRecord>> {
        let records: Vec<SupplyRecord> =
            rows.iter().filter_map(|row| self.supply_record(row)).collect();

        if records.is_empty() {
            return Err(Error::Ingest("No valid supply vehicles found".to_string()));
        }
        if records.len() < rows.len() {
            warn!(dropped = rows.len() - records.len(), "dropped malformed supply rows");
        }
        info!("Loaded {} supply vehicles", records.len());
        Ok(records)
    }

    fn demand_event(&self, row: &RawRow) -> Option<DemandEvent> {
        if row.len() < 3 {
            return None;
        }

        let (time_idx, lat_idx, lng_idx) = if row.names_are(&["timestamp", "latitude", "longitude"]) {
            (0, 1, 2)
        } else {
            match (row.find_column(TIME_COLUMN), row.find_column(LAT_COLUMN), row.find_column(LNG_COLUMN)) {
                (Some(t), Some(lat), Some(lng)) => (t, lat, lng),
                _ => (0, 1, 2),
            }
        };

        let timestamp = self.timestamps.parse(row.value_at(time_idx)?)?;
        let latitude = row.value_at(lat_idx)?.as_coordinate()?;
        let longitude = row.value_at(lng_idx)?.as_coordinate()?;
        Some(DemandEvent::new(timestamp, latitude, longitude))
    }

    fn supply_record(&self, row: &RawRow) -> Option<SupplyRecord> {
        if row.len() < 4 {
            return None;
        }

        let named = (
            row.find_column(START_COLUMN),
            row.find_column(END_COLUMN),
            row.find_column(LAT_COLUMN),
            row.find_column(LNG_COLUMN),
        );
        let (start_idx, end_idx, lat_idx, lng_idx) = match named {
            (Some(s), Some(e), Some(lat), Some(lng)) => (s, e, lat, lng),
            _ => (0, 1, 2, 3),
        };

        let start_time = self.supply_time(row.value_at(start_idx)?)?;
        let end_time = self.supply_time(row.value_at(end_idx)?)?;
        let latitude = row.value_at(lat_idx)?.as_coordinate()?;
        let longitude = row.value_at(lng_idx)?.as_coordinate()?;
        Some(SupplyRecord::new(start_time, end_time, latitude, longitude))
    }

    fn supply_time(&self, value: &RawValue) -> Option<u64> {
        if value.is_blank_timestamp() {
            return None;
        }
        self.timestamps.parse(value)
    }
}
