//! Server-Sent Events stream of domain events

use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
};
use livecast_core::{StreamMessage, Subscription};
use std::convert::Infallible;
use tokio_stream::StreamExt;

/// SSE endpoint. Clients must ask for `text/event-stream`.
pub async fn event_stream(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !accepts_event_stream(&headers) {
        return (
            StatusCode::NOT_ACCEPTABLE,
            "This endpoint only serves text/event-stream",
        )
            .into_response();
    }

    let subscription = Subscription::open(
        &state.bus,
        &state.connections,
        state.config.sse_ping_interval,
    );
    // Dropping the response body drops the subscription, which unregisters it
    let stream = subscription.map(|message| Ok::<_, Infallible>(to_event(&message)));

    Sse::new(stream).into_response()
}

fn accepts_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains("text/event-stream"))
}

fn to_event(message: &StreamMessage) -> Event {
    Event::default()
        .event(message.event.as_str())
        .data(message.data.to_string())
}
