use super::cell_aggregator::aggregate;
use super::coverage::expand_coverage;
use super::ratio::DisplayMode;
use super::temporal_filter::{filter_demand, filter_supply};
use crate::core::{DemandEvent, GeoPoint, SupplyRecord};
use crate::indexing::CellIndexer;
use std::collections::BTreeSet;
use tracing::debug;

/// Parameters of one aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationParams {
    /// Instant at which supply is evaluated and demand lookback is anchored.
    pub snapshot_time: u64,
    /// Demand lookback in minutes.
    pub window_minutes: u32,
    /// Grid resolution handed to the indexer.
    pub resolution: u8,
}

/// An occupied cell with its counts and metric.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedCell<C> {
    pub cell_id: C,
    pub demand_count: u32,
    pub supply_count: u32,
    pub ratio: f64,
    pub center: GeoPoint,
}

/// An empty border cell next to occupied ones. Carries no metric.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageCell<C> {
    pub cell_id: C,
    pub center: GeoPoint,
}

/// Result of one pass, ordered by cell id.
#[derive(Debug, Clone, PartialEq)]
pub struct HexOverlay<C> {
    pub mode: DisplayMode,
    pub active_cells: Vec<AggregatedCell<C>>,
    pub inactive_cells: Vec<CoverageCell<C>>,
    /// Points that survived the temporal filter.
    pub filtered_demand: usize,
    pub filtered_supply: usize,
}

impl<C> HexOverlay<C> {
    pub fn empty() -> Self {
        HexOverlay {
            mode: DisplayMode::Empty,
            active_cells: Vec::new(),
            inactive_cells: Vec::new(),
            filtered_demand: 0,
            filtered_supply: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active_cells.is_empty()
    }
}

/// Runs a full pass: temporal filter, cell aggregation, ratio, coverage.
///
/// Pure function of its inputs; a new overlay is built every call.
pub fn run_aggregation<I: CellIndexer>(
    indexer: &I,
    demand: &[DemandEvent],
    supply: &[SupplyRecord],
    params: &AggregationParams,
) -> HexOverlay<I::Cell> {
    let demand = filter_demand(demand, params.snapshot_time, params.window_minutes);
    let supply = filter_supply(supply, params.snapshot_time);

    let mode = DisplayMode::from_presence(!demand.is_empty(), !supply.is_empty());
    let counts = aggregate(indexer, &demand, &supply, params.resolution);

    let active_cells: Vec<AggregatedCell<I::Cell>> = counts
        .iter()
        .map(|(&cell_id, counts)| AggregatedCell {
            cell_id,
            demand_count: counts.demand_count,
            supply_count: counts.supply_count,
            ratio: mode.ratio(counts.demand_count, counts.supply_count),
            center: indexer.center_of(cell_id),
        })
        .collect();

    let occupied: BTreeSet<I::Cell> = counts.keys().copied().collect();
    let inactive_cells: Vec<CoverageCell<I::Cell>> = expand_coverage(indexer, &occupied)
        .into_iter()
        .map(|cell_id| CoverageCell { cell_id, center: indexer.center_of(cell_id) })
        .collect();

    debug!(
        active = active_cells.len(),
        inactive = inactive_cells.len(),
        demand = demand.len(),
        supply = supply.len(),
        %mode,
        "created hexagon overlay"
    );

    HexOverlay {
        mode,
        active_cells,
        inactive_cells,
        filtered_demand: demand.len(),
        filtered_supply: supply.len(),
    }
}
