//! Analysis parameters and the bounds the control surfaces enforce.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Smallest resolution offered to users.
pub const MIN_RESOLUTION: u8 = 5;
/// Largest resolution offered to users.
pub const MAX_RESOLUTION: u8 = 12;

/// Demand lookback choices, in minutes.
pub const WINDOW_PRESETS: [u32; 8] = [15, 30, 60, 90, 120, 360, 720, 1440];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// H3 resolution used to bucket points
    pub resolution: u8,
    /// Demand lookback window in minutes
    pub window_minutes: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { resolution: 8, window_minutes: 60 }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        validate_resolution(self.resolution)
    }
}

pub fn validate_resolution(resolution: u8) -> Result<()> {
    if (MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "resolution {} outside supported range {}-{}",
            resolution, MIN_RESOLUTION, MAX_RESOLUTION
        )))
    }
}

/// Approximate hexagon edge size for a resolution, as shown next to the
/// resolution slider.
pub fn resolution_edge_label(resolution: u8) -> &'static str {
    match resolution {
        5 => "~100-200 km",
        6 => "~14-36 km",
        7 => "~2-5 km",
        8 => "~0.7-1.9 km",
        9 => "~100-300 m",
        10 => "~66-122 m",
        11 => "~9-17 m",
        12 => "~1.3-2.5 m",
        _ => "~0.7-1.9 km",
    }
}
