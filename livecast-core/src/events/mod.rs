//! Real-time fan-out: the domain event bus and SSE subscriptions

mod bus;
mod connection;
mod subscription;

pub use bus::{EventBus, DEFAULT_CAPACITY};
pub use connection::{ConnectionGuard, ConnectionInfo, ConnectionManager};
pub use subscription::{StreamMessage, Subscription, DEFAULT_PING_INTERVAL};
