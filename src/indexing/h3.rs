//! H3 implementation of [`CellIndexer`] using the `h3o` crate.

use super::CellIndexer;
use crate::core::GeoPoint;
use h3o::{CellIndex, LatLng, Resolution};

/// Stateless adapter from `h3o` to the indexing seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct H3Indexer;

impl H3Indexer {
    pub fn new() -> Self {
        H3Indexer
    }
}

impl CellIndexer for H3Indexer {
    type Cell = CellIndex;

    fn cell_for(&self, latitude: f64, longitude: f64, resolution: u8) -> Option<CellIndex> {
        let resolution = Resolution::try_from(resolution).ok()?;
        let latlng = LatLng::new(latitude, longitude).ok()?;
        Some(latlng.to_cell(resolution))
    }

    fn center_of(&self, cell: CellIndex) -> GeoPoint {
        let center = LatLng::from(cell);
        GeoPoint::new(center.lat(), center.lng())
    }

    fn ring_neighbors(&self, cell: CellIndex) -> Option<Vec<CellIndex>> {
        // grid_disk_safe(1) yields the origin too
        let neighbors: Vec<CellIndex> =
            cell.grid_disk_safe(1).filter(|neighbor| *neighbor != cell).collect();
        if neighbors.is_empty() {
            None
        } else {
            Some(neighbors)
        }
    }
}
