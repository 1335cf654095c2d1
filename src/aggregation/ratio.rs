//! Demand/supply metric per cell and its label formatting.

use serde::Serialize;
use std::fmt;

/// Which metric the whole map shows, decided once per aggregation pass from
/// whether each filtered dataset is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Demand and supply both present: `demand / supply`.
    Ratio,
    /// Demand only: raw demand count.
    Count,
    /// No demand: every cell reads zero.
    Empty,
}

impl DisplayMode {
    pub fn from_presence(demand_present: bool, supply_present: bool) -> Self {
        match (demand_present, supply_present) {
            (true, true) => DisplayMode::Ratio,
            (true, false) => DisplayMode::Count,
            (false, _) => DisplayMode::Empty,
        }
    }

    /// Metric for one cell under this mode. May be `f64::INFINITY` in ratio
    /// mode when a cell has demand but no supply.
    pub fn ratio(self, demand_count: u32, supply_count: u32) -> f64 {
        match self {
            DisplayMode::Ratio => {
                if supply_count == 0 {
                    if demand_count > 0 {
                        f64::INFINITY
                    } else {
                        0.0
                    }
                } else {
                    f64::from(demand_count) / f64::from(supply_count)
                }
            }
            DisplayMode::Count => f64::from(demand_count),
            DisplayMode::Empty => 0.0,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Ratio => write!(f, "ratio"),
            DisplayMode::Count => write!(f, "count"),
            DisplayMode::Empty => write!(f, "empty"),
        }
    }
}

/// Metric for one cell given global dataset presence.
pub fn compute_ratio(
    demand_count: u32,
    supply_count: u32,
    demand_present: bool,
    supply_present: bool,
) -> f64 {
    DisplayMode::from_presence(demand_present, supply_present).ratio(demand_count, supply_count)
}

/// Map label for a metric value.
pub fn format_ratio(ratio: f64) -> String {
    if ratio.is_infinite() {
        return "∞".to_string();
    }
    if ratio == 0.0 {
        return "0".to_string();
    }
    if ratio < 0.01 {
        "<0.01".to_string()
    } else if ratio < 1.0 {
        format!("{:.2}", ratio)
    } else if ratio < 10.0 {
        format!("{:.1}", ratio)
    } else {
        format!("{}", ratio.round())
    }
}
