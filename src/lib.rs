//! # hexdemand
//!
//! hexdemand turns timestamped demand points and time-bounded supply positions
//! into a hexagonal-grid overlay for a chosen instant.
//!
//! Demand is kept when it falls inside a trailing window that ends at the
//! snapshot instant, supply when it is available at that instant. Surviving
//! points are bucketed into H3 cells, each cell gets a demand/supply ratio
//! (or a plain demand count when no supply is loaded), and the immediate ring
//! of empty neighbors is reported as coverage context.
//!
//! ## Features
//!
//! - Pure, idempotent aggregation pass over an immutable input snapshot
//! - CSV ingestion with column-name heuristics and several timestamp formats
//! - Per-user event store with bincode snapshots
//! - REST API over the whole pipeline
//!
//! ## Example
//!
//! ```rust
//! use hexdemand::aggregation::{run_aggregation, AggregationParams, DisplayMode};
//! use hexdemand::core::DemandEvent;
//! use hexdemand::indexing::H3Indexer;
//!
//! let demand = vec![DemandEvent::new(1_704_103_200_000, 40.7128, -74.0060)];
//! let params =
//!     AggregationParams { snapshot_time: 1_704_103_200_000, window_minutes: 60, resolution: 8 };
//!
//! let overlay = run_aggregation(&H3Indexer::new(), &demand, &[], &params);
//! assert_eq!(overlay.mode, DisplayMode::Count);
//! assert_eq!(overlay.active_cells.len(), 1);
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::new_without_default)]

/// Core data structures and types
pub mod core;

/// Cell indexing primitive and its H3 implementation
pub mod indexing;

/// Temporal filter, cell aggregator, ratio calculator and coverage expander
pub mod aggregation;

/// Module for parsing uploaded demand and supply files
pub mod parsing;

pub mod storage;

pub mod config;

pub mod session;

/// HTTP API over the aggregation pipeline
pub mod http;

pub mod error {
    //! Error types and result definitions

    use thiserror::Error;

    /// Result type alias for hexdemand operations
    pub type Result<T> = std::result::Result<T, Error>;

    /// Main error type for hexdemand
    #[derive(Debug, Error)]
    pub enum Error {
        /// Configuration error
        #[error("Configuration error: {0}")]
        Config(String),
        /// Uploaded data could not be turned into demand or supply
        #[error("Ingest error: {0}")]
        Ingest(String),
        /// Event store error
        #[error("Store error: {0}")]
        Store(String),
        /// IO error
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        /// Malformed CSV document
        #[error("CSV error: {0}")]
        Csv(#[from] csv::Error),
        /// JSON or bincode (de)serialization error
        #[error("Serialization error: {0}")]
        Serialization(String),
        /// Invalid regular expression
        #[error("Pattern error: {0}")]
        Pattern(#[from] regex::Error),
        /// Other error
        #[error("Error: {0}")]
        Other(String),
    }

    impl From<serde_json::Error> for Error {
        fn from(err: serde_json::Error) -> Self {
            Error::Serialization(err.to_string())
        }
    }

    impl From<bincode::Error> for Error {
        fn from(err: bincode::Error) -> Self {
            Error::Serialization(err.to_string())
        }
    }
}

// Re-export commonly used types
pub use error::{Error, Result};
