//! Webhook body parsing

use crate::error::ParseError;
use crate::types::WebhookEvent;
use serde_json::Value;

/// Parse a raw webhook body into a typed envelope.
///
/// Malformed JSON, a missing or non-string `type`, and a missing or
/// non-object `data` are all rejected; the caller answers 400.
pub fn parse_event(body: &[u8]) -> Result<WebhookEvent, ParseError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let Value::Object(mut envelope) = value else {
        return Err(ParseError::WrongType("envelope"));
    };

    let event_type = match envelope.remove("type") {
        Some(Value::String(t)) if !t.trim().is_empty() => t,
        Some(Value::String(_)) | None | Some(Value::Null) => {
            return Err(ParseError::MissingField("type"))
        }
        Some(_) => return Err(ParseError::WrongType("type")),
    };

    let data = match envelope.remove("data") {
        Some(Value::Object(data)) => data,
        None | Some(Value::Null) => return Err(ParseError::MissingField("data")),
        Some(_) => return Err(ParseError::WrongType("data")),
    };

    let id = envelope
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string);
    let created_at = envelope
        .get("created_at")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(WebhookEvent {
        event_type,
        data,
        id,
        created_at,
    })
}
