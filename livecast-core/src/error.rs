//! Error types for Livecast Core

use thiserror::Error;

/// Reasons a webhook signature is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("No webhook secret configured")]
    MissingSecret,

    #[error("Missing signature header")]
    MissingHeader,

    #[error("Malformed signature header: {0}")]
    MalformedHeader(String),

    #[error("Signature timestamp outside tolerance ({skew_secs}s skew)")]
    TimestampOutOfRange { skew_secs: i64 },

    #[error("Signature mismatch")]
    Mismatch,

    #[error("Secret cannot be used as an HMAC key")]
    InvalidKey,
}

/// Errors that occur while parsing a webhook body
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field has wrong type: {0}")]
    WrongType(&'static str),
}

/// Errors that occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backing store cannot be reached at all
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Backend error: {0}")]
    BackendError(String),
}

impl StoreError {
    /// Whether the backing store itself is down
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Errors from the notification side effects
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Email delivery failed: {0}")]
    Delivery(String),

    #[error("Email rejected by provider with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Template error: {0}")]
    Template(String),
}

/// Errors raised inside a webhook handler
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Malformed payload for {event_type}: {reason}")]
    Payload { event_type: String, reason: String },
}

/// Failure of the dispatcher as a whole. Only infrastructure outages
/// surface here; everything else is logged and absorbed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Infrastructure failure: {0}")]
    Infrastructure(StoreError),
}
