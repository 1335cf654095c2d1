//! Hexagonal grid indexing seam
//!
//! The aggregation engine never does hex geometry itself. It asks a
//! [`CellIndexer`] for three things: the cell containing a coordinate, the
//! center of a cell, and the ring-1 neighbors of a cell. [`H3Indexer`] is the
//! production implementation backed by `h3o`.

pub mod h3;
#[cfg(test)]
pub(crate) mod test_grid;

pub use h3::H3Indexer;

use crate::core::GeoPoint;
use std::fmt::Display;
use std::hash::Hash;

/// Grid indexing primitive used by the aggregation pipeline.
///
/// Lookups that can fail return `None`; callers skip the offending point or
/// cell and carry on.
pub trait CellIndexer {
    /// Opaque cell identifier. `Ord` keeps every aggregation pass ordered
    /// by cell id, so identical inputs produce identical output.
    type Cell: Copy + Ord + Hash + Display;

    /// Cell containing `(latitude, longitude)` at `resolution`.
    fn cell_for(&self, latitude: f64, longitude: f64, resolution: u8) -> Option<Self::Cell>;

    /// Center coordinate of `cell`.
    fn center_of(&self, cell: Self::Cell) -> GeoPoint;

    /// Cells at grid distance exactly 1 from `cell`.
    fn ring_neighbors(&self, cell: Self::Cell) -> Option<Vec<Self::Cell>>;
}
