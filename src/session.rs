//! Analysis session: the two loaded datasets, the current parameters and the
//! overlay computed from them.
//!
//! Every mutation recomputes the whole overlay from scratch; there is no
//! incremental update and no stale result is ever visible.

use crate::aggregation::{
    filter_demand, filter_supply, run_aggregation, AggregationParams, HexOverlay,
};
use crate::config::AnalyzerConfig;
use crate::core::{mean_timestamp, DemandEvent, GeoPoint, SupplyRecord, TimeBounds};
use crate::indexing::CellIndexer;
use tracing::info;

pub struct AnalysisSession<I: CellIndexer> {
    indexer: I,
    demand: Vec<DemandEvent>,
    supply: Vec<SupplyRecord>,
    params: AggregationParams,
    overlay: HexOverlay<I::Cell>,
}

impl<I: CellIndexer> AnalysisSession<I> {
    /// Empty session. The snapshot starts at `snapshot_time` until demand is
    /// loaded.
    pub fn new(indexer: I, config: AnalyzerConfig, snapshot_time: u64) -> Self {
        let params = AggregationParams {
            snapshot_time,
            window_minutes: config.window_minutes,
            resolution: config.resolution,
        };
        let mut session = AnalysisSession {
            indexer,
            demand: Vec::new(),
            supply: Vec::new(),
            params,
            overlay: HexOverlay::empty(),
        };
        session.recompute();
        session
    }

    /// Replaces the demand dataset and moves the snapshot to its mean timestamp.
    pub fn load_demand(&mut self, events: Vec<DemandEvent>) {
        if let Some(mean) = mean_timestamp(&events) {
            self.params.snapshot_time = mean;
        }
        info!("Demand dataset replaced with {} events", events.len());
        self.demand = events;
        self.recompute();
    }

    pub fn load_supply(&mut self, records: Vec<SupplyRecord>) {
        info!("Supply dataset replaced with {} vehicles", records.len());
        self.supply = records;
        self.recompute();
    }

    pub fn clear_demand(&mut self) {
        self.demand.clear();
        self.recompute();
    }

    pub fn clear_supply(&mut self) {
        self.supply.clear();
        self.recompute();
    }

    pub fn set_snapshot_time(&mut self, snapshot_time: u64) {
        self.params.snapshot_time = snapshot_time;
        self.recompute();
    }

    pub fn set_window_minutes(&mut self, window_minutes: u32) {
        self.params.window_minutes = window_minutes;
        self.recompute();
    }

    pub fn set_resolution(&mut self, resolution: u8) {
        self.params.resolution = resolution;
        self.recompute();
    }

    /// Replaces snapshot, window and resolution together with a single
    /// recomputation.
    pub fn set_params(&mut self, params: AggregationParams) {
        self.params = params;
        self.recompute();
    }

    pub fn params(&self) -> &AggregationParams {
        &self.params
    }

    pub fn overlay(&self) -> &HexOverlay<I::Cell> {
        &self.overlay
    }

    pub fn indexer(&self) -> &I {
        &self.indexer
    }

    pub fn demand_count(&self) -> usize {
        self.demand.len()
    }

    pub fn supply_count(&self) -> usize {
        self.supply.len()
    }

    /// Range covered by both datasets, for snapshot selection.
    pub fn time_bounds(&self) -> Option<TimeBounds> {
        TimeBounds::from_datasets(&self.demand, &self.supply)
    }

    /// Mean position of the points passing the current temporal filter.
    pub fn focus_point(&self) -> Option<GeoPoint> {
        let demand = filter_demand(&self.demand, self.params.snapshot_time, self.params.window_minutes);
        let supply = filter_supply(&self.supply, self.params.snapshot_time);

        let points: Vec<(f64, f64)> = demand
            .iter()
            .map(|e| (e.latitude, e.longitude))
            .chain(supply.iter().map(|v| (v.latitude, v.longitude)))
            .collect();
        if points.is_empty() {
            return None;
        }

        let n = points.len() as f64;
        let (lat_sum, lng_sum) =
            points.iter().fold((0.0, 0.0), |(lat, lng), (p_lat, p_lng)| (lat + p_lat, lng + p_lng));
        Some(GeoPoint::new(lat_sum / n, lng_sum / n))
    }

    fn recompute(&mut self) {
        self.overlay = run_aggregation(&self.indexer, &self.demand, &self.supply, &self.params);
    }
}
