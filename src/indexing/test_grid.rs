//! Square-grid indexer for unit tests.
//!
//! H3 never fails on valid coordinates, so this grid lets tests exercise the
//! skip paths: latitudes outside `[-90, 90]` have no cell, and cells listed in
//! `broken` have no neighbors.

use super::CellIndexer;
use crate::core::GeoPoint;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridCell(pub i32, pub i32);

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

/// One cell per whole degree; resolution must be 1.
#[derive(Debug, Default)]
pub struct SquareGridIndexer {
    pub broken: BTreeSet<GridCell>,
}

impl SquareGridIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broken(cells: &[GridCell]) -> Self {
        Self { broken: cells.iter().copied().collect() }
    }
}

impl CellIndexer for SquareGridIndexer {
    type Cell = GridCell;

    fn cell_for(&self, latitude: f64, longitude: f64, resolution: u8) -> Option<GridCell> {
        if resolution != 1 || !(-90.0..=90.0).contains(&latitude) || !longitude.is_finite() {
            return None;
        }
        Some(GridCell(latitude.floor() as i32, longitude.floor() as i32))
    }

    fn center_of(&self, cell: GridCell) -> GeoPoint {
        GeoPoint::new(cell.0 as f64 + 0.5, cell.1 as f64 + 0.5)
    }

    fn ring_neighbors(&self, cell: GridCell) -> Option<Vec<GridCell>> {
        if self.broken.contains(&cell) {
            return None;
        }
        let GridCell(row, col) = cell;
        Some(vec![
            GridCell(row - 1, col),
            GridCell(row + 1, col),
            GridCell(row, col - 1),
            GridCell(row, col + 1),
        ])
    }
}
