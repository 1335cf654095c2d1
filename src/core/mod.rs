//! Core data structures for hexdemand
//!
//! Instants are stored as milliseconds since the Unix epoch, the same way the
//! ingestion layer produces them.

use serde::{Deserialize, Serialize};

pub mod bounds;
pub use bounds::*;

/// Milliseconds in one minute
pub const MILLIS_PER_MINUTE: u64 = 60 * 1000;

/// A single demand event (for example a ride request) at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandEvent {
    pub timestamp: u64, // milliseconds since epoch
    pub latitude: f64,
    pub longitude: f64,
}

impl DemandEvent {
    pub fn new(timestamp: u64, latitude: f64, longitude: f64) -> Self {
        Self { timestamp, latitude, longitude }
    }
}

/// A supply vehicle available at a fixed position during a closed interval.
///
/// `start_time <= end_time` is expected but not enforced here; a record with
/// an inverted interval is simply never available.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplyRecord {
    pub start_time: u64,
    pub end_time: u64,
    pub latitude: f64,
    pub longitude: f64,
}

impl SupplyRecord {
    pub fn new(start_time: u64, end_time: u64, latitude: f64, longitude: f64) -> Self {
        Self { start_time, end_time, latitude, longitude }
    }

    /// True when `instant` lies inside `[start_time, end_time]`.
    pub fn is_available_at(&self, instant: u64) -> bool {
        self.start_time <= instant && instant <= self.end_time
    }
}

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// `[lng, lat]` ordering used by map renderers.
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supply_interval_is_closed() {
        let vehicle = SupplyRecord::new(1_000, 2_000, 40.71, -74.01);
        assert!(vehicle.is_available_at(1_000));
        assert!(vehicle.is_available_at(1_500));
        assert!(vehicle.is_available_at(2_000));
        assert!(!vehicle.is_available_at(999));
        assert!(!vehicle.is_available_at(2_001));
    }

    #[test]
    fn test_inverted_interval_is_never_available() {
        let vehicle = SupplyRecord::new(2_000, 1_000, 40.71, -74.01);
        assert!(!vehicle.is_available_at(1_500));
    }

    #[test]
    fn test_lng_lat_order() {
        let point = GeoPoint::new(40.71, -74.01);
        assert_eq!(point.lng_lat(), [-74.01, 40.71]);
    }
}
