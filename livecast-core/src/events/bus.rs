//! Process-wide broadcast channel for domain events

use crate::types::DomainEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Default number of events buffered per subscriber
pub const DEFAULT_CAPACITY: usize = 100;

/// Publish-subscribe channel between webhook handlers and SSE clients.
///
/// Built once at startup and cloned into whoever needs it. Every subscriber
/// sees events in the order they were emitted; a subscriber that is not
/// connected when an event is emitted never sees it.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Broadcast an event, returning how many subscribers received it.
    /// Having no subscribers is not an error.
    pub fn emit(&self, event: DomainEvent) -> usize {
        let kind = event.kind;
        match self.tx.send(event) {
            Ok(count) => {
                debug!(event = %kind, subscribers = count, "Emitted domain event");
                count
            }
            Err(_) => {
                debug!(event = %kind, "Emitted domain event with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
