//! Livecast Core Library
//!
//! This crate provides the types and processing pipeline for Mux live stream
//! webhooks: signature verification, parsing, routing, the live event state
//! machine, notifications, and the domain event bus that feeds Server-Sent
//! Events clients.

pub mod error;
pub mod events;
pub mod handlers;
pub mod notify;
pub mod store;
pub mod types;
pub mod webhook;

pub use error::{
    DispatchError, HandlerError, NotifyError, ParseError, SignatureError, StoreError,
};
pub use events::{ConnectionManager, EventBus, StreamMessage, Subscription};
pub use handlers::{HandlerContext, HandlerOutcome, WebhookDispatcher, DEFAULT_RECONNECT_WINDOW};
pub use notify::{EmailSender, HttpMailer, LogMailer, Notifier};
pub use store::{JsonFileStore, LiveEventStore, MemoryStore, SettingsProvider};
pub use types::{
    DomainEvent, DomainEventKind, LiveEvent, LiveEventPatch, LiveStreamStatus, Notification,
    NotificationSettings, Severity, WebhookEvent,
};
pub use webhook::SignatureVerifier;
