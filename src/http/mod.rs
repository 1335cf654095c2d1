//! HTTP API module for hexdemand
//!
//! Provides REST endpoints for:
//! - Per-user demand event storage
//! - Stateless overlay computation
//! - A per-user analysis session fed by CSV uploads

pub mod server;

pub use server::{
    create_server, start_server, ApiError, AppState, ErrorResponse, ListEventsResponse,
    OverlayRequest, OverlayResponse, SessionSummaryResponse, SuccessResponse,
    UploadEventsRequest, UploadEventsResponse, USER_ID_HEADER,
};
