//! Core types for live events, webhooks and notifications

mod asset;
mod domain_event;
mod live_event;
mod notification;
mod webhook;

pub use asset::VideoAsset;
pub use domain_event::{DomainEvent, DomainEventKind};
pub use live_event::{
    AccessControl, DocumentStatus, LiveEvent, LiveEventPatch, LiveStreamStatus,
    SimulatedLiveState, SimulcastStatus, SimulcastTarget,
};
pub use notification::{NewNotification, Notification, NotificationSettings, Severity};
pub use webhook::WebhookEvent;
