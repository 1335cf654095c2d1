use crate::indexing::CellIndexer;
use std::collections::BTreeSet;
use tracing::warn;

/// Ring-1 fringe around the occupied cells.
///
/// Every returned cell neighbors at least one occupied cell and none of them
/// is occupied. A cell whose neighbor lookup fails contributes nothing.
pub fn expand_coverage<I: CellIndexer>(
    indexer: &I,
    occupied: &BTreeSet<I::Cell>,
) -> BTreeSet<I::Cell> {
    let mut fringe = BTreeSet::new();
    let mut failed_lookups = 0usize;

    for &cell in occupied {
        match indexer.ring_neighbors(cell) {
            Some(neighbors) => {
                fringe.extend(neighbors.into_iter().filter(|n| !occupied.contains(n)));
            }
            None => failed_lookups += 1,
        }
    }

    if failed_lookups > 0 {
        warn!(failed_lookups, "neighbor lookup failed for some occupied cells");
    }

    fringe
}
