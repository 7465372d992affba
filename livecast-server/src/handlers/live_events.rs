//! Admin endpoints for live events, notifications and settings

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use livecast_core::types::{AccessControl, LiveEvent, LiveStreamStatus, Notification};
use livecast_core::{NotificationSettings, StoreError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query parameters for listing live events
#[derive(Debug, Deserialize)]
pub struct ListLiveEventsQuery {
    /// Only events with this stream status
    pub live_status: Option<LiveStreamStatus>,
}

#[derive(Debug, Serialize)]
pub struct ListLiveEventsResponse {
    pub live_events: Vec<LiveEvent>,
    pub total: usize,
}

/// List live events, newest first
pub async fn list_live_events(
    State(state): State<AppState>,
    Query(query): Query<ListLiveEventsQuery>,
) -> Result<Json<ListLiveEventsResponse>, StatusCode> {
    let live_events: Vec<LiveEvent> = state
        .store
        .list()
        .await
        .map_err(|e| store_status(&e))?
        .into_iter()
        .filter(|event| query.live_status.map_or(true, |s| event.live_status == s))
        .collect();

    Ok(Json(ListLiveEventsResponse {
        total: live_events.len(),
        live_events,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateLiveEventRequest {
    pub title: String,
    pub mux_live_stream_id: Option<String>,
    #[serde(default)]
    pub access: AccessControl,
    pub scheduled_start: Option<DateTime<Utc>>,
}

/// Create a live event, optionally bound to a Mux stream
pub async fn create_live_event(
    State(state): State<AppState>,
    Json(request): Json<CreateLiveEventRequest>,
) -> Result<(StatusCode, Json<LiveEvent>), (StatusCode, String)> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Title is required".to_string()));
    }

    let mut event = LiveEvent::new(title).with_access(request.access);
    if let Some(stream_id) = request.mux_live_stream_id.filter(|s| !s.trim().is_empty()) {
        event = event.with_stream_id(stream_id.trim());
    }
    event.scheduled_start = request.scheduled_start;

    let created = state
        .store
        .insert(event)
        .await
        .map_err(|e| (store_status(&e), e.to_string()))?;
    tracing::info!(live_event = %created.id, title = %created.title, "Created live event");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a single live event
pub async fn get_live_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LiveEvent>, StatusCode> {
    let id = Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| store_status(&e))?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Most recent notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<Vec<Notification>>, StatusCode> {
    let mut notifications = state
        .store
        .list_notifications()
        .await
        .map_err(|e| store_status(&e))?;
    notifications.truncate(query.limit);
    Ok(Json(notifications))
}

pub async fn get_notification_settings(
    State(state): State<AppState>,
) -> Result<Json<NotificationSettings>, StatusCode> {
    state
        .settings
        .notification_settings()
        .await
        .map(Json)
        .map_err(|e| store_status(&e))
}

pub async fn update_notification_settings(
    State(state): State<AppState>,
    Json(settings): Json<NotificationSettings>,
) -> Result<Json<NotificationSettings>, (StatusCode, String)> {
    if settings.email_notifications_enabled
        && settings
            .notification_email
            .as_deref()
            .map_or(true, |to| !to.contains('@'))
    {
        return Err((
            StatusCode::BAD_REQUEST,
            "A valid notification_email is required when emails are enabled".to_string(),
        ));
    }

    let updated = state
        .settings
        .update_notification_settings(settings)
        .await
        .map_err(|e| (store_status(&e), e.to_string()))?;
    tracing::info!(
        enabled = updated.email_notifications_enabled,
        "Updated notification settings"
    );
    Ok(Json(updated))
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
