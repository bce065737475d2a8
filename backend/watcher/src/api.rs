//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db;
use crate::errors::WatcherError;
use crate::events::{ChallengeStatus, EventRecord};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/donors/:address/events", get(get_donor_events))
        .route("/status", get(get_status))
        .route("/refreshes", get(get_refreshes))
        .route("/refreshes/:request_id", get(get_refresh))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct DonorEventsResponse {
    pub address: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: ChallengeStatus,
    /// A refresh was requested and its callback has not been indexed yet.
    pub refresh_pending: bool,
    pub last_request_id: Option<i64>,
    pub last_resolved_request_id: Option<i64>,
    /// Row id of the latest resolution; pass it as `after` to `/refreshes`.
    pub last_refresh_row: Option<i64>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshesQuery {
    #[serde(default)]
    pub after: i64,
}

/// Turns a storage failure into a JSON 500.
pub struct ApiError(WatcherError);

impl From<WatcherError> for ApiError {
    fn from(e: WatcherError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events`
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> ApiResult<Json<EventsResponse>> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(EventsResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /donors/:address/events`
pub async fn get_donor_events(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<DonorEventsResponse>> {
    let events = db::get_events_for_actor(&state.pool, &address).await?;
    Ok(Json(DonorEventsResponse {
        address,
        count: events.len(),
        events,
    }))
}

/// `GET /status`
///
/// Status as last reported by the oracle, or `closed` once a sweep has been
/// indexed.
pub async fn get_status(State(state): State<Arc<ApiState>>) -> ApiResult<Json<StatusResponse>> {
    let refresh = db::latest_refresh(&state.pool).await?;
    let request = db::latest_request(&state.pool).await?;
    let swept = db::latest_sweep(&state.pool).await?.is_some();

    let last_request_id = request.and_then(|r| r.request_id);
    let last_resolved_request_id = refresh.as_ref().and_then(|r| r.request_id);

    let status = if swept {
        ChallengeStatus::Closed
    } else {
        refresh
            .as_ref()
            .and_then(|r| r.status.as_deref())
            .and_then(ChallengeStatus::parse)
            .unwrap_or(ChallengeStatus::Ongoing)
    };

    let refresh_pending = match (last_request_id, last_resolved_request_id) {
        (Some(asked), Some(answered)) => asked > answered,
        (Some(_), None) => true,
        (None, _) => false,
    };

    Ok(Json(StatusResponse {
        status,
        refresh_pending: refresh_pending && !status.is_terminal(),
        last_request_id,
        last_resolved_request_id,
        last_refresh_row: refresh.map(|r| r.id),
    }))
}

/// `GET /refreshes?after=<row id>`
pub async fn get_refreshes(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<RefreshesQuery>,
) -> ApiResult<Json<EventsResponse>> {
    let events = db::get_refreshes_after(&state.pool, query.after).await?;
    Ok(Json(EventsResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /refreshes/:request_id`
///
/// 404 until the oracle callback for `request_id` has been indexed.
pub async fn get_refresh(
    State(state): State<Arc<ApiState>>,
    Path(request_id): Path<i64>,
) -> ApiResult<Response> {
    let response = match db::get_refresh(&state.pool, request_id).await? {
        Some(record) => (StatusCode::OK, Json(record)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("request {request_id} has not been resolved"),
            }),
        )
            .into_response(),
    };
    Ok(response)
}
