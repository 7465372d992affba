//! Request handlers

mod events;
mod live_events;
mod webhook;

pub use events::*;
pub use live_events::*;
pub use webhook::*;

use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Open SSE connections
    pub sse_connections: usize,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        sse_connections: state.connections.active_count(),
    })
}
