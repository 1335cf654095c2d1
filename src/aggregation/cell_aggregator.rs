//! Buckets filtered points into grid cells.

use crate::core::{DemandEvent, SupplyRecord};
use crate::indexing::CellIndexer;
use std::collections::BTreeMap;
use tracing::warn;

/// Per-cell tallies for one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    pub demand_count: u32,
    pub supply_count: u32,
}

impl CellCounts {
    pub fn is_empty(&self) -> bool {
        self.demand_count == 0 && self.supply_count == 0
    }
}

/// Counts demand events and supply vehicles per cell.
///
/// The key set is the union of cells touched by either dataset; a cell seen
/// only by one dataset carries a zero count for the other. Points the indexer
/// cannot place are skipped.
pub fn aggregate<I: CellIndexer>(
    indexer: &I,
    demand: &[DemandEvent],
    supply: &[SupplyRecord],
    resolution: u8,
) -> BTreeMap<I::Cell, CellCounts> {
    let mut cells: BTreeMap<I::Cell, CellCounts> = BTreeMap::new();

    let demand_cells =
        demand.iter().filter_map(|e| indexer.cell_for(e.latitude, e.longitude, resolution));
    let mut demand_placed = 0usize;
    for cell in demand_cells {
        cells.entry(cell).or_default().demand_count += 1;
        demand_placed += 1;
    }

    let supply_cells =
        supply.iter().filter_map(|v| indexer.cell_for(v.latitude, v.longitude, resolution));
    let mut supply_placed = 0usize;
    for cell in supply_cells {
        cells.entry(cell).or_default().supply_count += 1;
        supply_placed += 1;
    }

    let skipped = (demand.len() - demand_placed) + (supply.len() - supply_placed);
    if skipped > 0 {
        warn!(skipped, resolution, "points without a grid cell were skipped");
    }

    cells
}
