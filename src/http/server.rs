//! HTTP API Server for hexdemand
//!
//! Provides REST endpoints for per-user event storage, stateless overlay
//! computation and a per-user analysis session fed by CSV uploads.

use crate::{
    aggregation::{format_ratio, run_aggregation, AggregationParams, DisplayMode, HexOverlay},
    config::{resolution_edge_label, validate_resolution, AnalyzerConfig},
    core::{mean_timestamp, DemandEvent, SupplyRecord, TimeBounds},
    error::Error,
    indexing::H3Indexer,
    parsing::{read_demand_csv, read_supply_csv, RowParser},
    session::AnalysisSession,
    storage::{EventStore, EventUpload, StoredEvent, UserId},
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt::Display,
    sync::{Arc, Mutex, MutexGuard},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Header carrying the caller's opaque user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Request to store demand events for the caller
#[derive(Debug, Deserialize)]
pub struct UploadEventsRequest {
    pub events: Vec<EventUpload>,
}

#[derive(Debug, Serialize)]
pub struct UploadEventsResponse {
    pub success: bool,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ListEventsResponse {
    pub events: Vec<StoredEvent>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ClearEventsResponse {
    pub success: bool,
    pub removed: usize,
}

/// Stateless aggregation request
#[derive(Debug, Deserialize)]
pub struct OverlayRequest {
    #[serde(default)]
    pub demand: Vec<DemandEvent>,
    #[serde(default)]
    pub supply: Vec<SupplyRecord>,
    pub snapshot_time: u64,
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u32,
    #[serde(default = "default_resolution")]
    pub resolution: u8,
}

fn default_window_minutes() -> u32 {
    AnalyzerConfig::default().window_minutes
}

fn default_resolution() -> u8 {
    AnalyzerConfig::default().resolution
}

/// Optional parameters for the stored-events overlay and session updates.
/// A missing field keeps its current (or default) value.
#[derive(Debug, Default, Deserialize)]
pub struct OverlayParamsQuery {
    pub snapshot_time: Option<u64>,
    pub window_minutes: Option<u32>,
    pub resolution: Option<u8>,
}

/// An occupied cell as sent to map clients
#[derive(Debug, Serialize)]
pub struct ActiveCellResponse {
    pub cell_id: String,
    pub demand_count: u32,
    pub supply_count: u32,
    /// `None` when the ratio is infinite (demand without supply)
    pub ratio: Option<f64>,
    pub label: String,
    /// `[lng, lat]`
    pub center: [f64; 2],
}

#[derive(Debug, Serialize)]
pub struct InactiveCellResponse {
    pub cell_id: String,
    pub center: [f64; 2],
}

/// Overlay wire format shared by every overlay endpoint and the CLI
#[derive(Debug, Serialize)]
pub struct OverlayResponse {
    pub mode: DisplayMode,
    pub active_cells: Vec<ActiveCellResponse>,
    pub inactive_cells: Vec<InactiveCellResponse>,
}

impl<C: Display> From<&HexOverlay<C>> for OverlayResponse {
    fn from(overlay: &HexOverlay<C>) -> Self {
        let active_cells = overlay
            .active_cells
            .iter()
            .map(|cell| ActiveCellResponse {
                cell_id: cell.cell_id.to_string(),
                demand_count: cell.demand_count,
                supply_count: cell.supply_count,
                ratio: Some(cell.ratio).filter(|r| r.is_finite()),
                label: format_ratio(cell.ratio),
                center: cell.center.lng_lat(),
            })
            .collect();

        let inactive_cells = overlay
            .inactive_cells
            .iter()
            .map(|cell| InactiveCellResponse {
                cell_id: cell.cell_id.to_string(),
                center: cell.center.lng_lat(),
            })
            .collect();

        OverlayResponse { mode: overlay.mode, active_cells, inactive_cells }
    }
}

#[derive(Debug, Serialize)]
pub struct TimeBoundsResponse {
    pub min_time: u64,
    pub max_time: u64,
    pub total_days: u64,
}

impl From<TimeBounds> for TimeBoundsResponse {
    fn from(bounds: TimeBounds) -> Self {
        TimeBoundsResponse {
            min_time: bounds.min_time,
            max_time: bounds.max_time,
            total_days: bounds.total_days(),
        }
    }
}

/// Response for session state
#[derive(Debug, Serialize)]
pub struct SessionSummaryResponse {
    pub demand_count: usize,
    pub supply_count: usize,
    pub snapshot_time: u64,
    pub window_minutes: u32,
    pub resolution: u8,
    pub resolution_label: String,
    pub mode: DisplayMode,
    pub active_cells: usize,
    pub inactive_cells: usize,
    pub time_bounds: Option<TimeBoundsResponse>,
    /// `[lng, lat]` of the filtered points, for map centering
    pub focus: Option<[f64; 2]>,
}

impl From<&AnalysisSession<H3Indexer>> for SessionSummaryResponse {
    fn from(session: &AnalysisSession<H3Indexer>) -> Self {
        let params = session.params();
        let overlay = session.overlay();
        SessionSummaryResponse {
            demand_count: session.demand_count(),
            supply_count: session.supply_count(),
            snapshot_time: params.snapshot_time,
            window_minutes: params.window_minutes,
            resolution: params.resolution,
            resolution_label: resolution_edge_label(params.resolution).to_string(),
            mode: overlay.mode,
            active_cells: overlay.active_cells.len(),
            inactive_cells: overlay.inactive_cells.len(),
            time_bounds: session.time_bounds().map(TimeBoundsResponse::from),
            focus: session.focus_point().map(|p| p.lng_lat()),
        }
    }
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Shared application state
pub struct AppState {
    pub store: Arc<EventStore>,
    pub sessions: Mutex<HashMap<UserId, AnalysisSession<H3Indexer>>>,
    pub parser: RowParser,
    /// Parameters given to newly created sessions
    pub config: AnalyzerConfig,
}

impl AppState {
    pub fn new(store: Arc<EventStore>, config: AnalyzerConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(AppState {
            store,
            sessions: Mutex::new(HashMap::new()),
            parser: RowParser::new()?,
            config,
        })
    }
}

/// Custom error type for API errors
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Config(_) | Error::Ingest(_) | Error::Csv(_) => {
                ApiError::BadRequest(err.to_string())
            }
            other => {
                warn!("Internal error while handling request: {}", other);
                ApiError::InternalError(other.to_string())
            }
        }
    }
}

/// Create the HTTP server with all routes
pub fn create_server(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/events", post(upload_events).get(list_events).delete(clear_events))
        .route("/api/events/overlay", get(events_overlay))
        .route("/api/overlay", post(compute_overlay))
        .route("/api/session", get(session_summary).delete(delete_session))
        .route("/api/session/demand", post(load_session_demand).delete(clear_session_demand))
        .route("/api/session/supply", post(load_session_supply).delete(clear_session_supply))
        .route("/api/session/params", put(update_session_params))
        .route("/api/session/overlay", get(session_overlay))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn user_id(headers: &HeaderMap) -> Result<UserId, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", USER_ID_HEADER)))
}

fn check_resolution(resolution: Option<u8>) -> Result<(), ApiError> {
    match resolution {
        Some(resolution) => Ok(validate_resolution(resolution)?),
        None => Ok(()),
    }
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

fn lock_sessions(
    state: &AppState,
) -> Result<MutexGuard<'_, HashMap<UserId, AnalysisSession<H3Indexer>>>, ApiError> {
    state
        .sessions
        .lock()
        .map_err(|_| ApiError::InternalError("session lock poisoned".to_string()))
}

/// Runs `f` against the caller's session, creating an empty one first if
/// needed. Only dataset uploads may create a session.
fn with_session<T>(
    state: &AppState,
    user: &str,
    f: impl FnOnce(&mut AnalysisSession<H3Indexer>) -> T,
) -> Result<T, ApiError> {
    let mut sessions = lock_sessions(state)?;
    let session = sessions
        .entry(user.to_string())
        .or_insert_with(|| AnalysisSession::new(H3Indexer::new(), state.config, now_millis()));
    Ok(f(session))
}

/// Runs `f` against the caller's session, or 404 if there is none.
fn with_existing_session<T>(
    state: &AppState,
    user: &str,
    f: impl FnOnce(&mut AnalysisSession<H3Indexer>) -> T,
) -> Result<T, ApiError> {
    let mut sessions = lock_sessions(state)?;
    let session = sessions
        .get_mut(user)
        .ok_or_else(|| ApiError::NotFound(format!("No session for user {}", user)))?;
    Ok(f(session))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(SuccessResponse { message: "hexdemand HTTP API is running".to_string() })
}

/// POST /api/events - Store demand events for the caller
async fn upload_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UploadEventsRequest>,
) -> Result<Json<UploadEventsResponse>, ApiError> {
    let user = user_id(&headers)?;
    let count = state.store.upload(&user, payload.events)?;
    info!("Stored {} events for user {}", count, user);

    Ok(Json(UploadEventsResponse { success: true, count }))
}

/// GET /api/events - List the caller's events
async fn list_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ListEventsResponse>, ApiError> {
    let user = user_id(&headers)?;
    let events = state.store.list(&user)?;
    let total = events.len();

    Ok(Json(ListEventsResponse { events, total }))
}

/// DELETE /api/events - Remove all of the caller's events
async fn clear_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ClearEventsResponse>, ApiError> {
    let user = user_id(&headers)?;
    let removed = state.store.clear(&user)?;

    Ok(Json(ClearEventsResponse { success: true, removed }))
}

/// GET /api/events/overlay - Overlay of the caller's stored events as demand
async fn events_overlay(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<OverlayParamsQuery>,
) -> Result<Json<OverlayResponse>, ApiError> {
    let user = user_id(&headers)?;
    check_resolution(query.resolution)?;

    let demand: Vec<DemandEvent> =
        state.store.list(&user)?.iter().filter_map(StoredEvent::to_demand_event).collect();
    if demand.is_empty() {
        return Err(ApiError::NotFound(format!("No stored events for user {}", user)));
    }

    let params = AggregationParams {
        snapshot_time: query
            .snapshot_time
            .or_else(|| mean_timestamp(&demand))
            .unwrap_or_else(now_millis),
        window_minutes: query.window_minutes.unwrap_or(state.config.window_minutes),
        resolution: query.resolution.unwrap_or(state.config.resolution),
    };
    let overlay = run_aggregation(&H3Indexer::new(), &demand, &[], &params);

    Ok(Json(OverlayResponse::from(&overlay)))
}

/// POST /api/overlay - One stateless aggregation pass
async fn compute_overlay(
    Json(payload): Json<OverlayRequest>,
) -> Result<Json<OverlayResponse>, ApiError> {
    validate_resolution(payload.resolution)?;

    let params = AggregationParams {
        snapshot_time: payload.snapshot_time,
        window_minutes: payload.window_minutes,
        resolution: payload.resolution,
    };
    let overlay = run_aggregation(&H3Indexer::new(), &payload.demand, &payload.supply, &params);

    Ok(Json(OverlayResponse::from(&overlay)))
}

/// GET /api/session - Summary of the caller's session
async fn session_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionSummaryResponse>, ApiError> {
    let user = user_id(&headers)?;
    let summary =
        with_existing_session(&state, &user, |session| SessionSummaryResponse::from(&*session))?;

    Ok(Json(summary))
}

/// DELETE /api/session - Drop the caller's session and both datasets
async fn delete_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, ApiError> {
    let user = user_id(&headers)?;
    lock_sessions(&state)?
        .remove(&user)
        .ok_or_else(|| ApiError::NotFound(format!("No session for user {}", user)))?;
    info!("Session of user {} removed", user);

    Ok(Json(SuccessResponse { message: "Session removed".to_string() }))
}

/// POST /api/session/demand - Replace the session's demand with a CSV upload
async fn load_session_demand(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<SessionSummaryResponse>, ApiError> {
    let user = user_id(&headers)?;
    let events = read_demand_csv(&state.parser, body.as_bytes())?;

    let summary = with_session(&state, &user, |session| {
        session.load_demand(events);
        SessionSummaryResponse::from(&*session)
    })?;

    Ok(Json(summary))
}

/// POST /api/session/supply - Replace the session's supply with a CSV upload
async fn load_session_supply(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<SessionSummaryResponse>, ApiError> {
    let user = user_id(&headers)?;
    let records = read_supply_csv(&state.parser, body.as_bytes())?;

    let summary = with_session(&state, &user, |session| {
        session.load_supply(records);
        SessionSummaryResponse::from(&*session)
    })?;

    Ok(Json(summary))
}

/// DELETE /api/session/demand
async fn clear_session_demand(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionSummaryResponse>, ApiError> {
    let user = user_id(&headers)?;
    let summary = with_existing_session(&state, &user, |session| {
        session.clear_demand();
        SessionSummaryResponse::from(&*session)
    })?;

    Ok(Json(summary))
}

/// DELETE /api/session/supply
async fn clear_session_supply(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionSummaryResponse>, ApiError> {
    let user = user_id(&headers)?;
    let summary = with_existing_session(&state, &user, |session| {
        session.clear_supply();
        SessionSummaryResponse::from(&*session)
    })?;

    Ok(Json(summary))
}

/// PUT /api/session/params - Move the snapshot, window or resolution
async fn update_session_params(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<OverlayParamsQuery>,
) -> Result<Json<SessionSummaryResponse>, ApiError> {
    let user = user_id(&headers)?;
    check_resolution(payload.resolution)?;

    let summary = with_existing_session(&state, &user, |session| {
        let current = *session.params();
        session.set_params(AggregationParams {
            snapshot_time: payload.snapshot_time.unwrap_or(current.snapshot_time),
            window_minutes: payload.window_minutes.unwrap_or(current.window_minutes),
            resolution: payload.resolution.unwrap_or(current.resolution),
        });
        SessionSummaryResponse::from(&*session)
    })?;

    Ok(Json(summary))
}

/// GET /api/session/overlay - Current overlay of the caller's session
async fn session_overlay(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<OverlayResponse>, ApiError> {
    let user = user_id(&headers)?;
    let overlay =
        with_existing_session(&state, &user, |session| OverlayResponse::from(session.overlay()))?;

    Ok(Json(overlay))
}

/// Start the HTTP server on the specified address
pub async fn start_server(
    addr: &str,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("hexdemand HTTP API server listening on http://{}", addr);
    println!();
    println!("Available endpoints:");
    println!("  POST   /api/events           - Store demand events (x-user-id header)");
    println!("  GET    /api/events           - List stored events");
    println!("  DELETE /api/events           - Clear stored events");
    println!("  GET    /api/events/overlay   - Overlay of stored events");
    println!("  POST   /api/overlay          - Stateless overlay computation");
    println!("  GET    /api/session          - Session summary");
    println!("  DELETE /api/session          - Drop the session");
    println!("  POST   /api/session/demand   - Load demand CSV into the session");
    println!("  POST   /api/session/supply   - Load supply CSV into the session");
    println!("  DELETE /api/session/demand   - Clear session demand");
    println!("  DELETE /api/session/supply   - Clear session supply");
    println!("  PUT    /api/session/params   - Update snapshot, window or resolution");
    println!("  GET    /api/session/overlay  - Current session overlay");
    println!("  GET    /health               - Health check");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{AggregatedCell, CoverageCell};
    use crate::core::GeoPoint;

    #[test]
    fn test_infinite_ratio_serializes_as_null() {
        let overlay = HexOverlay {
            mode: DisplayMode::Ratio,
            active_cells: vec![AggregatedCell {
                cell_id: 7u64,
                demand_count: 3,
                supply_count: 0,
                ratio: f64::INFINITY,
                center: GeoPoint::new(40.0, -74.0),
            }],
            inactive_cells: vec![CoverageCell { cell_id: 8u64, center: GeoPoint::new(41.0, -74.0) }],
            filtered_demand: 3,
            filtered_supply: 1,
        };

        let json = serde_json::to_value(OverlayResponse::from(&overlay)).unwrap();
        assert_eq!(json["mode"], "ratio");
        assert!(json["active_cells"][0]["ratio"].is_null());
        assert_eq!(json["active_cells"][0]["label"], "∞");
        assert_eq!(json["active_cells"][0]["center"], serde_json::json!([-74.0, 40.0]));
        assert_eq!(json["inactive_cells"][0]["cell_id"], "8");
    }

    #[test]
    fn test_user_id_header() {
        let mut headers = HeaderMap::new();
        assert!(matches!(user_id(&headers), Err(ApiError::Unauthorized(_))));

        headers.insert(USER_ID_HEADER, "alice".parse().unwrap());
        assert_eq!(user_id(&headers).unwrap(), "alice");
    }

    #[test]
    fn test_ingest_error_is_bad_request() {
        let err = ApiError::from(Error::Ingest("No valid demand events found".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(Error::Store("lock".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
