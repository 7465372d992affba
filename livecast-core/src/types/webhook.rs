//! The webhook envelope delivered by Mux

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One externally-originated occurrence, `{ type, data }`.
///
/// Lives for a single request and is never mutated after parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookEvent {
    /// Provider event type, e.g. `video.live_stream.active`
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event payload; always a JSON object
    pub data: Map<String, Value>,

    /// Provider event id, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl WebhookEvent {
    pub fn new(event_type: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            id: None,
            created_at: None,
        }
    }

    /// A string field of `data`, if present and non-empty
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// `data.id` - the id of the object the event is about
    pub fn data_id(&self) -> Option<&str> {
        self.data_str("id")
    }

    /// Back-reference to a live stream (`data.live_stream_id`)
    pub fn live_stream_id(&self) -> Option<&str> {
        self.data_str("live_stream_id")
    }

    /// Asset currently recording a live stream
    pub fn active_asset_id(&self) -> Option<&str> {
        self.data_str("active_asset_id")
            .or_else(|| self.data_str("asset_id"))
    }

    /// Last dot-separated segment of the event type (`active`, `ready`, ...)
    pub fn action(&self) -> &str {
        self.event_type
            .rsplit('.')
            .next()
            .unwrap_or(self.event_type.as_str())
    }

    /// First public playback id from `data.playback_ids`
    pub fn public_playback_id(&self) -> Option<&str> {
        self.playback_ids()
            .find(|(_, policy)| *policy == Some("public"))
            .or_else(|| self.playback_ids().next())
            .map(|(id, _)| id)
    }

    /// All `(id, policy)` pairs from `data.playback_ids`
    pub fn playback_ids(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.data
            .get("playback_ids")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|entry| {
                let id = entry.get("id").and_then(Value::as_str)?;
                Some((id, entry.get("policy").and_then(Value::as_str)))
            })
    }
}
