//! API routes

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Origins allowed when LIVECAST_CORS_ORIGINS is unset
const DEV_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origins.as_deref());

    let api_routes = Router::new()
        // Inbound webhooks
        .route("/mux/webhook", post(handlers::receive_webhook))
        // SSE endpoint
        .route("/events/stream", get(handlers::event_stream))
        // Admin
        .route(
            "/live-events",
            get(handlers::list_live_events).post(handlers::create_live_event),
        )
        .route("/live-events/:id", get(handlers::get_live_event))
        .route("/notifications", get(handlers::list_notifications))
        .route(
            "/settings/notifications",
            get(handlers::get_notification_settings).put(handlers::update_notification_settings),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS from a comma-separated origin list, or "*" for any
fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let allow_origin = match origins {
        Some("*") => AllowOrigin::any(),
        Some(origins) => AllowOrigin::list(parse_origins(origins.split(','))),
        None => AllowOrigin::list(parse_origins(DEV_ORIGINS.into_iter())),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn parse_origins<'a>(origins: impl Iterator<Item = &'a str>) -> Vec<HeaderValue> {
    origins
        .filter_map(|origin| origin.trim().parse().ok())
        .collect()
}
