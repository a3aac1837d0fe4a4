//! REST API handlers for the event query server

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use crate::error::{Error, RacecalErrorTrait};
use crate::query::{EventQuery, EventQueryParams};

use super::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub events: usize,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(list_events))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.repository.count() {
        Ok(events) => (
            StatusCode::OK,
            Json(ApiResponse::success(HealthResponse {
                status: "healthy".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                uptime_secs: state.start_time.elapsed().as_secs(),
                events,
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not reach the event store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::failure("event store unavailable")),
            )
        }
    }
}

async fn list_events(
    State(state): State<AppState>,
    params: Result<Query<EventQueryParams>, QueryRejection>,
) -> impl IntoResponse {
    let query = params
        .map_err(|e| Error::query(e.body_text()))
        .and_then(|Query(params)| EventQuery::from_params(&params));

    let query = match query {
        Ok(query) => query,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected event query");
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::failure(e.to_string())));
        }
    };

    match state.repository.list_all() {
        Ok(events) => {
            let now = Utc::now().with_timezone(&state.offset);
            let events = query.apply(events, now);
            (StatusCode::OK, Json(ApiResponse::success(events)))
        }
        Err(e) => {
            let e = Error::storage(&e);
            tracing::error!(error = %e, category = %e.category(), "Failed to load events");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("failed to load events")),
            )
        }
    }
}
