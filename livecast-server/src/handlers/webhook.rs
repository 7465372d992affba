//! Mux webhook endpoint

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use livecast_core::webhook::{parse_event, BYPASS_HEADER, SIGNATURE_HEADER};
use livecast_core::{DispatchError, SignatureError};
use serde::Serialize;
use serde_json::json;

/// Response body for an accepted webhook
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
}

/// Why a webhook was not accepted
#[derive(Debug)]
pub enum WebhookRejection {
    /// Missing or invalid signature (401)
    Unauthorized(SignatureError),
    /// Body is not a webhook envelope (400)
    Malformed(String),
    /// The store could not be reached (500); the provider will redeliver
    Unavailable,
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebhookRejection::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "Invalid signature".to_string())
            }
            WebhookRejection::Malformed(reason) => (StatusCode::BAD_REQUEST, reason),
            WebhookRejection::Unavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Service temporarily unavailable".to_string(),
            ),
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

/// Receive a Mux webhook: verify, parse, dispatch
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, WebhookRejection> {
    if bypass_requested(&state, &headers) {
        tracing::warn!("Skipping webhook signature verification (development bypass)");
    } else {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok());
        if let Err(e) = state.verifier.verify(signature, &body) {
            tracing::warn!(error = %e, "Rejected webhook with invalid signature");
            return Err(WebhookRejection::Unauthorized(e));
        }
    }

    let event = parse_event(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected malformed webhook body");
        WebhookRejection::Malformed(e.to_string())
    })?;

    tracing::info!(event_type = %event.event_type, "Received webhook");

    match state.dispatcher.dispatch(&event).await {
        Ok(_) => Ok(Json(WebhookAck { success: true })),
        Err(DispatchError::Infrastructure(_)) => Err(WebhookRejection::Unavailable),
    }
}

/// The bypass header is only honored in development
fn bypass_requested(state: &AppState, headers: &HeaderMap) -> bool {
    let requested = headers
        .get(BYPASS_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    if requested && !state.config.is_development() {
        tracing::warn!("Ignoring signature bypass header outside development");
        return false;
    }
    requested
}
