//! Per-connection event streams for Server-Sent Events
//!
//! A [`Subscription`] yields one `connected` message carrying the
//! connection id, then every domain event emitted on the bus in order,
//! interleaved with a `ping` every interval so proxies keep the connection
//! open.

use super::bus::EventBus;
use super::connection::{ConnectionGuard, ConnectionManager};
use crate::types::DomainEvent;
use chrono::Utc;
use serde_json::{json, Value};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

/// Default keep-alive interval
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

/// One named message on an event stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamMessage {
    pub event: String,
    pub data: Value,
}

impl StreamMessage {
    pub fn connected(connection_id: Uuid) -> Self {
        Self {
            event: "connected".to_string(),
            data: json!({ "connectionId": connection_id }),
        }
    }

    pub fn ping() -> Self {
        Self {
            event: "ping".to_string(),
            data: json!({ "timestamp": Utc::now() }),
        }
    }

    pub fn from_domain(event: &DomainEvent) -> Option<Self> {
        match serde_json::to_value(event) {
            Ok(data) => Some(Self {
                event: event.name().to_string(),
                data,
            }),
            Err(e) => {
                warn!(event = %event.kind, error = %e, "Failed to serialize domain event");
                None
            }
        }
    }

    /// Render as a `text/event-stream` frame
    pub fn to_frame(&self) -> String {
        format!("event: {}\ndata: {}\n\n", self.event, self.data)
    }
}

type MessageStream = Pin<Box<dyn Stream<Item = StreamMessage> + Send>>;

/// An open event stream bound to one registered connection.
///
/// Dropping the subscription (client went away, write failed) or calling
/// [`Subscription::close`] releases the bus receiver, the ping timer and the
/// connection registration together.
pub struct Subscription {
    guard: ConnectionGuard,
    inner: MessageStream,
}

impl Subscription {
    pub fn open(bus: &EventBus, connections: &ConnectionManager, ping_interval: Duration) -> Self {
        let guard = connections.open();
        let connection_id = guard.id();

        let events = BroadcastStream::new(bus.subscribe()).filter_map(move |result| match result {
            Ok(event) => StreamMessage::from_domain(&event),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(
                    connection_id = %connection_id,
                    skipped,
                    "SSE client lagged behind event bus"
                );
                None
            }
        });

        let mut ticker = interval_at(Instant::now() + ping_interval, ping_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let pings = IntervalStream::new(ticker).map(|_| StreamMessage::ping());

        let inner = tokio_stream::once(StreamMessage::connected(connection_id))
            .chain(events.merge(pings));

        info!(
            connection_id = %connection_id,
            active = connections.active_count(),
            "SSE client connected"
        );

        Self {
            guard,
            inner: Box::pin(inner),
        }
    }

    pub fn connection_id(&self) -> Uuid {
        self.guard.id()
    }

    /// Cancel the stream. Safe to call more than once.
    pub fn close(&mut self) {
        if self.guard.close() {
            // Drops the bus receiver and the ping timer
            self.inner = Box::pin(tokio_stream::empty());
            info!(connection_id = %self.guard.id(), "SSE client disconnected");
        }
    }
}

impl Stream for Subscription {
    type Item = StreamMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.guard.is_closed() {
            return Poll::Ready(None);
        }
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}
