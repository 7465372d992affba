//! The LiveEvent document - one scheduled or in-progress broadcast

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle status of the Mux live stream behind an event
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LiveStreamStatus {
    #[default]
    Idle,
    Active,
    Disconnected,
    Completed,
    Disabled,
}

impl LiveStreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiveStreamStatus::Idle => "idle",
            LiveStreamStatus::Active => "active",
            LiveStreamStatus::Disconnected => "disconnected",
            LiveStreamStatus::Completed => "completed",
            LiveStreamStatus::Disabled => "disabled",
        }
    }
}

impl fmt::Display for LiveStreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document-level publication status, independent of the stream itself
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Scheduled,
    Active,
    Ended,
}

/// Who may watch the event
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessControl {
    #[default]
    Free,
    Subscription,
    Paid { price_cents: u64, currency: String },
}

/// Status of a single simulcast (restream) target
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimulcastStatus {
    #[default]
    Idle,
    Starting,
    Broadcasting,
    Errored,
}

impl SimulcastStatus {
    /// Parse the suffix of a `simulcast_target.*` event type
    pub fn from_event_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "created" | "idle" => Some(SimulcastStatus::Idle),
            "starting" => Some(SimulcastStatus::Starting),
            "broadcasting" => Some(SimulcastStatus::Broadcasting),
            "errored" => Some(SimulcastStatus::Errored),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimulcastStatus::Idle => "idle",
            SimulcastStatus::Starting => "starting",
            SimulcastStatus::Broadcasting => "broadcasting",
            SimulcastStatus::Errored => "errored",
        }
    }
}

/// A restream destination attached to a live event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulcastTarget {
    /// Mux simulcast target id
    pub id: String,

    /// RTMP destination URL
    pub url: Option<String>,

    pub status: SimulcastStatus,
}

/// Last known state of a simulated-live broadcast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulatedLiveState {
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

/// One scheduled or in-progress live broadcast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveEvent {
    pub id: Uuid,

    pub title: String,

    /// Stream identifier assigned by Mux
    pub mux_live_stream_id: Option<String>,

    /// Current lifecycle status of the stream
    #[serde(default)]
    pub live_status: LiveStreamStatus,

    /// Document-level status
    #[serde(default)]
    pub status: DocumentStatus,

    /// When the encoder last dropped, cleared on recovery
    pub disconnected_at: Option<DateTime<Utc>>,

    /// Mux asset holding the recording of this broadcast
    pub recording_asset_id: Option<String>,

    pub recording_playback_id: Option<String>,

    #[serde(default)]
    pub access: AccessControl,

    #[serde(default)]
    pub simulcast_targets: Vec<SimulcastTarget>,

    pub simulated_live: Option<SimulatedLiveState>,

    pub scheduled_start: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl LiveEvent {
    /// Create a new event with the given title
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            mux_live_stream_id: None,
            live_status: LiveStreamStatus::Idle,
            status: DocumentStatus::Draft,
            disconnected_at: None,
            recording_asset_id: None,
            recording_playback_id: None,
            access: AccessControl::Free,
            simulcast_targets: Vec::new(),
            simulated_live: None,
            scheduled_start: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach the Mux stream id
    pub fn with_stream_id(mut self, stream_id: impl Into<String>) -> Self {
        self.mux_live_stream_id = Some(stream_id.into());
        self
    }

    pub fn with_access(mut self, access: AccessControl) -> Self {
        self.access = access;
        self
    }

    /// Apply a patch in place. Fields left as `None` are untouched.
    pub fn apply(&mut self, patch: LiveEventPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(live_status) = patch.live_status {
            self.live_status = live_status;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(disconnected_at) = patch.disconnected_at {
            self.disconnected_at = disconnected_at;
        }
        if let Some(asset_id) = patch.recording_asset_id {
            self.recording_asset_id = Some(asset_id);
        }
        if let Some(playback_id) = patch.recording_playback_id {
            self.recording_playback_id = Some(playback_id);
        }
        if let Some(targets) = patch.simulcast_targets {
            self.simulcast_targets = targets;
        }
        if let Some(simulated) = patch.simulated_live {
            self.simulated_live = Some(simulated);
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update of a LiveEvent.
///
/// `disconnected_at` is doubly optional so that clearing the timestamp
/// (`Some(None)`) is distinct from leaving it alone (`None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveEventPatch {
    pub title: Option<String>,
    pub live_status: Option<LiveStreamStatus>,
    pub status: Option<DocumentStatus>,
    pub disconnected_at: Option<Option<DateTime<Utc>>>,
    pub recording_asset_id: Option<String>,
    pub recording_playback_id: Option<String>,
    pub simulcast_targets: Option<Vec<SimulcastTarget>>,
    pub simulated_live: Option<SimulatedLiveState>,
}

impl LiveEventPatch {
    pub fn live_status(status: LiveStreamStatus) -> Self {
        Self {
            live_status: Some(status),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_event_creation() {
        let event = LiveEvent::new("Launch Stream").with_stream_id("ls_123");
        assert_eq!(event.title, "Launch Stream");
        assert_eq!(event.mux_live_stream_id.as_deref(), Some("ls_123"));
        assert_eq!(event.live_status, LiveStreamStatus::Idle);
        assert!(event.disconnected_at.is_none());
    }

    #[test]
    fn test_patch_clears_disconnect_timestamp() {
        let mut event = LiveEvent::new("Recovery");
        event.apply(LiveEventPatch {
            live_status: Some(LiveStreamStatus::Disconnected),
            disconnected_at: Some(Some(Utc::now())),
            ..Default::default()
        });
        assert!(event.disconnected_at.is_some());

        event.apply(LiveEventPatch {
            live_status: Some(LiveStreamStatus::Active),
            disconnected_at: Some(None),
            ..Default::default()
        });
        assert_eq!(event.live_status, LiveStreamStatus::Active);
        assert!(event.disconnected_at.is_none());
    }

    #[test]
    fn test_patch_leaves_untouched_fields() {
        let mut event = LiveEvent::new("Untouched");
        event.recording_asset_id = Some("asset_1".to_string());
        event.apply(LiveEventPatch::live_status(LiveStreamStatus::Idle));
        assert_eq!(event.recording_asset_id.as_deref(), Some("asset_1"));
        assert_eq!(event.title, "Untouched");
    }

    #[test]
    fn test_access_control_serialization() {
        let access = AccessControl::Paid {
            price_cents: 499,
            currency: "usd".to_string(),
        };
        let json = serde_json::to_value(&access).unwrap();
        assert_eq!(json["type"], "paid");
        assert_eq!(json["price_cents"], 499);
    }
}
