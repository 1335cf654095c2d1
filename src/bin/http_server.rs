//! HTTP Server Binary for the hexdemand API
//!
//! Starts the REST API with a per-user event store, optionally backed by a
//! snapshot file that is written back on shutdown.
//!
//! Usage:
//!   cargo run --bin http_server -- --host 0.0.0.0 --port 8080 --store-file ./data/events.bin

use clap::Parser;
use hexdemand::{
    config::{resolution_edge_label, AnalyzerConfig},
    http::{start_server, AppState},
    storage::EventStore,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hexdemand HTTP Server")]
#[command(about = "HTTP API server for hexagonal demand/supply analysis", long_about = None)]
struct Args {
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Event store snapshot; events stay in memory only when omitted
    #[arg(short, long)]
    store_file: Option<String>,

    /// Resolution of newly created sessions (5-12)
    #[arg(long, default_value = "8")]
    resolution: u8,

    /// Demand lookback of newly created sessions, in minutes
    #[arg(long, default_value = "60")]
    window: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║              hexdemand Demand/Supply Analyzer                  ║");
    println!("║                    HTTP API Server                             ║");
    println!("╚════════════════════════════════════════════════════════════════╝");
    println!();

    // Initialize event store
    let store = match &args.store_file {
        Some(path) => {
            println!("Opening event store at: {}", path);
            EventStore::open(path)?
        }
        None => {
            println!("Using in-memory event store");
            EventStore::new()?
        }
    };
    let store = Arc::new(store);
    println!();

    let config = AnalyzerConfig { resolution: args.resolution, window_minutes: args.window };
    println!("Session defaults:");
    println!(
        "  - Resolution: {} ({})",
        config.resolution,
        resolution_edge_label(config.resolution)
    );
    println!("  - Window: {} minutes", config.window_minutes);
    println!();

    let state = Arc::new(AppState::new(Arc::clone(&store), config)?);

    // Start HTTP server
    let addr = format!("{}:{}", args.host, args.port);
    println!("Starting HTTP server...");
    println!();

    // Set up graceful shutdown
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to install CTRL+C signal handler: {}", e);
        }
        println!();
        println!("Shutdown signal received, stopping server...");
    };

    // Run server with graceful shutdown
    tokio::select! {
        result = start_server(&addr, state) => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = shutdown_signal => {
            println!("Server shut down gracefully");
        }
    }

    store.persist()?;
    if let Some(path) = &args.store_file {
        println!("Event store saved to {}", path);
    }

    Ok(())
}
