use crate::core::{DemandEvent, SupplyRecord, MILLIS_PER_MINUTE};

/// Lookback window for demand, anchored at the snapshot instant.
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemandWindow {
    pub start: u64,
    pub end: u64,
}

impl DemandWindow {
    /// `[snapshot - window_minutes, snapshot]`. The start saturates at the epoch.
    pub fn ending_at(snapshot_time: u64, window_minutes: u32) -> Self {
        let width = u64::from(window_minutes) * MILLIS_PER_MINUTE;
        DemandWindow { start: snapshot_time.saturating_sub(width), end: snapshot_time }
    }

    pub fn contains(&self, timestamp: u64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Demand events whose timestamp falls in the lookback window ending at
/// `snapshot_time`.
pub fn filter_demand(
    events: &[DemandEvent],
    snapshot_time: u64,
    window_minutes: u32,
) -> Vec<DemandEvent> {
    let window = DemandWindow::ending_at(snapshot_time, window_minutes);
    events.iter().filter(|e| window.contains(e.timestamp)).copied().collect()
}

/// Supply vehicles available at `snapshot_time`. No lookback applies to supply.
pub fn filter_supply(records: &[SupplyRecord], snapshot_time: u64) -> Vec<SupplyRecord> {
    records.iter().filter(|r| r.is_available_at(snapshot_time)).copied().collect()
}
