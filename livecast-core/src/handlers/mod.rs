//! Webhook handlers and the dispatcher that routes events to them
//!
//! Error policy: a handler error is logged with its context and absorbed so
//! the webhook is still acknowledged. Answering with an error would make
//! the provider redeliver the same event indefinitely. The one exception is
//! an infrastructure outage (store unavailable), which is reported so the
//! delivery is retried once the store is back.

mod asset;
mod live_stream;
mod recording;
mod simulated_live;
mod simulcast;

use crate::error::{DispatchError, HandlerError};
use crate::events::EventBus;
use crate::notify::Notifier;
use crate::store::LiveEventStore;
use crate::types::{DomainEvent, DomainEventKind, LiveEvent, WebhookEvent};
use crate::webhook::{categorize, EventCategory};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Default time an encoder has to reconnect before the stream goes idle
pub const DEFAULT_RECONNECT_WINDOW: Duration = Duration::from_secs(60);

/// Collaborators shared by all handlers
#[derive(Clone)]
pub struct HandlerContext {
    pub store: Arc<dyn LiveEventStore>,
    pub notifier: Notifier,
    pub bus: EventBus,
    /// Mentioned in disconnect notifications
    pub reconnect_window: Duration,
}

impl HandlerContext {
    /// Publish a domain event about a live event
    fn emit(&self, kind: DomainEventKind, live_event: &LiveEvent, status: &str) {
        self.bus.emit(
            DomainEvent::new(kind)
                .for_live_event(live_event.id, live_event.mux_live_stream_id.as_deref())
                .with_status(status),
        );
    }
}

/// What a handler did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// State changed (or a status update went out) and this event was emitted
    Applied(DomainEventKind),
    /// No local record references the event's object
    NoMatchingRecord,
    /// Payload lacked something the handler needs
    Skipped(&'static str),
    /// Event type needs no handling
    Ignored,
    /// The handler failed; the error was logged
    Failed,
}

/// Routes parsed webhooks to the handler for their category
#[derive(Clone)]
pub struct WebhookDispatcher {
    ctx: HandlerContext,
}

impl WebhookDispatcher {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    pub async fn dispatch(&self, event: &WebhookEvent) -> Result<HandlerOutcome, DispatchError> {
        let category = categorize(event);
        debug!(
            event_type = %event.event_type,
            category = category.label(),
            "Dispatching webhook"
        );

        let result = match category {
            EventCategory::SimulcastTarget => simulcast::handle(&self.ctx, event).await,
            EventCategory::SimulatedLive => simulated_live::handle(&self.ctx, event).await,
            EventCategory::LiveStream(kind) => live_stream::handle(&self.ctx, event, kind).await,
            EventCategory::Recording => recording::handle(&self.ctx, event).await,
            EventCategory::Asset => asset::handle(&self.ctx, event).await,
            EventCategory::Unhandled => Ok(HandlerOutcome::Ignored),
        };

        match result {
            Ok(outcome) => {
                info!(
                    event_type = %event.event_type,
                    category = category.label(),
                    outcome = ?outcome,
                    "Handled webhook"
                );
                Ok(outcome)
            }
            Err(HandlerError::Store(e)) if e.is_unavailable() => {
                error!(
                    event_type = %event.event_type,
                    category = category.label(),
                    error = %e,
                    "Store unavailable while handling webhook"
                );
                Err(DispatchError::Infrastructure(e))
            }
            Err(e) => {
                error!(
                    event_type = %event.event_type,
                    event_id = event.id.as_deref().unwrap_or("-"),
                    object_id = event.data_id().unwrap_or("-"),
                    category = category.label(),
                    error = %e,
                    "Webhook handler failed"
                );
                Ok(HandlerOutcome::Failed)
            }
        }
    }
}

/// A required payload field was missing
fn missing(event: &WebhookEvent, field: &str) -> HandlerError {
    HandlerError::Payload {
        event_type: event.event_type.clone(),
        reason: format!("missing data.{}", field),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::notify::testing::RecordingMailer;
    use crate::store::MemoryStore;
    use serde_json::Value;

    pub struct Harness {
        pub store: Arc<MemoryStore>,
        pub mailer: Arc<RecordingMailer>,
        pub bus: EventBus,
        pub dispatcher: WebhookDispatcher,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_mailer(RecordingMailer::default())
        }

        pub fn with_mailer(mailer: RecordingMailer) -> Self {
            let store = Arc::new(MemoryStore::new());
            let mailer = Arc::new(mailer);
            let bus = EventBus::new(32);
            let notifier = Notifier::new(store.clone(), store.clone(), mailer.clone());
            let dispatcher = WebhookDispatcher::new(HandlerContext {
                store: store.clone(),
                notifier,
                bus: bus.clone(),
                reconnect_window: DEFAULT_RECONNECT_WINDOW,
            });
            Self {
                store,
                mailer,
                bus,
                dispatcher,
            }
        }

        pub async fn dispatch(&self, event_type: &str, data: Value) -> HandlerOutcome {
            self.dispatcher
                .dispatch(&event(event_type, data))
                .await
                .unwrap()
        }
    }

    pub fn event(event_type: &str, data: Value) -> WebhookEvent {
        match data {
            Value::Object(map) => WebhookEvent::new(event_type, map),
            _ => panic!("data must be an object"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{event, Harness};
    use super::*;
    use crate::types::LiveEvent;
    use serde_json::json;

    #[tokio::test]
    async fn test_unhandled_events_are_ignored() {
        let h = Harness::new();
        let outcome = h.dispatch("video.upload.created", json!({ "id": "up_1" })).await;
        assert_eq!(outcome, HandlerOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_handler_errors_are_absorbed() {
        let h = Harness::new();
        // Lifecycle events need data.id
        let outcome = h.dispatch("video.live_stream.active", json!({})).await;
        assert_eq!(outcome, HandlerOutcome::Failed);
    }

    #[tokio::test]
    async fn test_store_outage_is_reported() {
        let h = Harness::new();
        h.store
            .insert(LiveEvent::new("Down").with_stream_id("ls_1"))
            .await
            .unwrap();
        h.store.set_unavailable(true);

        let result = h
            .dispatcher
            .dispatch(&event("video.live_stream.active", json!({ "id": "ls_1" })))
            .await;
        assert!(matches!(result, Err(DispatchError::Infrastructure(_))));
    }
}
