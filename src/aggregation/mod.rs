//! Spatio-temporal aggregation engine
//!
//! One pass runs four stages in order:
//!
//! - **temporal_filter** - demand inside the lookback window, supply available
//!   at the snapshot
//! - **cell_aggregator** - per-cell demand and supply counts
//! - **ratio** - one metric per occupied cell under a map-wide [`DisplayMode`]
//! - **coverage** - ring-1 border of empty cells around the occupied ones
//!
//! # Example
//!
//! ```
//! use hexdemand::aggregation::{run_aggregation, AggregationParams};
//! use hexdemand::core::DemandEvent;
//! use hexdemand::indexing::H3Indexer;
//!
//! let demand = vec![DemandEvent::new(1_000, 40.71, -74.01)];
//! let params = AggregationParams { snapshot_time: 1_000, window_minutes: 60, resolution: 8 };
//!
//! let overlay = run_aggregation(&H3Indexer::new(), &demand, &[], &params);
//! assert_eq!(overlay.active_cells.len(), 1);
//! assert_eq!(overlay.inactive_cells.len(), 6);
//! ```

pub mod cell_aggregator;
pub mod coverage;
pub mod pipeline;
pub mod ratio;
pub mod temporal_filter;

pub use cell_aggregator::{aggregate, CellCounts};
pub use coverage::expand_coverage;
pub use pipeline::{run_aggregation, AggregatedCell, AggregationParams, CoverageCell, HexOverlay};
pub use ratio::{compute_ratio, format_ratio, DisplayMode};
pub use temporal_filter::{filter_demand, filter_supply, DemandWindow};
