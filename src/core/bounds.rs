//! Dataset-level time helpers used to position the snapshot slider.

use crate::core::{DemandEvent, SupplyRecord};
use serde::Serialize;

/// Earliest and latest instant found across both datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

impl TimeBounds {
    /// Covers demand timestamps plus supply start and end times.
    /// Returns `None` when both datasets are empty.
    pub fn from_datasets(demand: &[DemandEvent], supply: &[SupplyRecord]) -> Option<Self> {
        let instants = demand
            .iter()
            .map(|e| e.timestamp)
            .chain(supply.iter().flat_map(|v| [v.start_time, v.end_time]));

        instants.fold(None, |bounds, t| match bounds {
            None => Some(TimeBounds { min_time: t, max_time: t }),
            Some(b) => Some(TimeBounds { min_time: b.min_time.min(t), max_time: b.max_time.max(t) }),
        })
    }

    /// Number of whole days the bounds span, rounded up.
    pub fn total_days(&self) -> u64 {
        const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;
        (self.max_time - self.min_time).div_ceil(MILLIS_PER_DAY)
    }
}

/// Mean demand timestamp, used as the default snapshot after a demand upload.
pub fn mean_timestamp(events: &[DemandEvent]) -> Option<u64> {
    if events.is_empty() {
        return None;
    }
    let sum: u128 = events.iter().map(|e| e.timestamp as u128).sum();
    Some((sum / events.len() as u128) as u64)
}
