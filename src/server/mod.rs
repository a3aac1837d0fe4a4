//! Event query HTTP server
//!
//! Serves the stored event set through `GET /events` and a `GET /health`
//! probe. Responses use the `{ success, data, error }` envelope from
//! [`api::ApiResponse`].

pub mod api;

use std::time::Instant;

use anyhow::{Context, Result};
use axum::Router;
use chrono::FixedOffset;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::crawler::fixed_offset;
use crate::storage::SharedEventRepository;

pub use api::{create_router, ApiResponse};

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Event store
    pub repository: SharedEventRepository,

    /// Calendar time zone; `onlyRegistering` and `createdAtTimes` use it
    pub offset: FixedOffset,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(repository: SharedEventRepository, utc_offset_hours: i32) -> Result<Self> {
        let offset = fixed_offset(utc_offset_hours)
            .with_context(|| format!("Invalid UTC offset {utc_offset_hours}h"))?;

        Ok(Self {
            repository,
            offset,
            start_time: Instant::now(),
        })
    }
}

// ============================================================================
// Server
// ============================================================================

/// Build the router with tracing and CORS layers
pub fn build_router(state: AppState) -> Router {
    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Serve the API on `addr` until `shutdown_signal` resolves
pub async fn serve(
    addr: &str,
    state: AppState,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!(addr = %addr, "Event API listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    tracing::info!("Event API shutdown complete");
    Ok(())
}
