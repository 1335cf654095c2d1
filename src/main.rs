//! hexdemand - hexagonal demand/supply overlay for a single snapshot
//!
//! This is the main entry point for the hexdemand command-line interface. It
//! reads demand (and optionally supply) CSV files, runs one aggregation pass
//! and writes the overlay as JSON.

use clap::Parser;
use hexdemand::{
    aggregation::{run_aggregation, AggregationParams},
    config::{resolution_edge_label, AnalyzerConfig, MAX_RESOLUTION, MIN_RESOLUTION},
    core::{mean_timestamp, TimeBounds},
    http::OverlayResponse,
    indexing::H3Indexer,
    parsing::{load_rows_from_path, RowParser},
    Error, Result,
};
use std::fs;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hexdemand")]
#[command(about = "Aggregate demand and supply points into a hexagonal overlay", long_about = None)]
struct Args {
    /// Demand CSV (timestamp, latitude, longitude)
    #[arg(short, long)]
    demand: String,

    /// Supply CSV (start time, end time, latitude, longitude)
    #[arg(short, long)]
    supply: Option<String>,

    /// Snapshot instant: milliseconds since epoch or a timestamp string.
    /// Defaults to the mean demand timestamp.
    #[arg(long)]
    snapshot: Option<String>,

    /// Demand lookback window in minutes
    #[arg(short, long, default_value = "60")]
    window: u32,

    /// H3 resolution
    #[arg(short, long, default_value = "8",
          value_parser = clap::value_parser!(u8).range(MIN_RESOLUTION as i64..=MAX_RESOLUTION as i64))]
    resolution: u8,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<String>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = AnalyzerConfig { resolution: args.resolution, window_minutes: args.window };
    config.validate()?;

    let parser = RowParser::new()?;

    let start = Instant::now();
    let demand = parser.parse_demand_rows(&load_rows_from_path(&args.demand)?)?;
    let supply = match &args.supply {
        Some(path) => parser.parse_supply_rows(&load_rows_from_path(path)?)?,
        None => Vec::new(),
    };
    info!(
        "Loaded {} demand events and {} supply vehicles in {:.3} ms",
        demand.len(),
        supply.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    if let Some(bounds) = TimeBounds::from_datasets(&demand, &supply) {
        info!(
            "Data covers {} to {} ({} days)",
            bounds.min_time,
            bounds.max_time,
            bounds.total_days()
        );
    }

    let snapshot_time = match &args.snapshot {
        Some(text) => parse_snapshot(&parser, text)?,
        None => mean_timestamp(&demand)
            .ok_or_else(|| Error::Config("no demand to derive a snapshot from".to_string()))?,
    };

    let params = AggregationParams {
        snapshot_time,
        window_minutes: config.window_minutes,
        resolution: config.resolution,
    };
    info!(
        "Aggregating at snapshot {} with a {} minute window, resolution {} ({})",
        params.snapshot_time,
        params.window_minutes,
        params.resolution,
        resolution_edge_label(params.resolution)
    );

    let start = Instant::now();
    let overlay = run_aggregation(&H3Indexer::new(), &demand, &supply, &params);
    info!(
        "Created {} active and {} inactive hexagons in {:.3} ms",
        overlay.active_cells.len(),
        overlay.inactive_cells.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let response = OverlayResponse::from(&overlay);
    let json = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            info!("Overlay written to {}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn parse_snapshot(parser: &RowParser, text: &str) -> Result<u64> {
    if let Ok(millis) = text.trim().parse::<u64>() {
        return Ok(millis);
    }
    parser
        .timestamps()
        .parse_text(text)
        .ok_or_else(|| Error::Config(format!("Invalid snapshot time: {}", text)))
}
