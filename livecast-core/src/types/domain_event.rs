//! Domain events published on the event bus after each state change

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Kinds of domain events. The wire name doubles as the SSE event name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEventKind {
    LiveStreamIdle,
    LiveStreamActive,
    LiveStreamDisconnected,
    LiveStreamRecording,
    LiveStreamStatus,
    LiveStreamDisabled,
    RecordingReady,
    SimulcastTargetUpdated,
    SimulatedLiveUpdated,
    AssetUpdated,
}

impl DomainEventKind {
    pub const ALL: [DomainEventKind; 10] = [
        DomainEventKind::LiveStreamIdle,
        DomainEventKind::LiveStreamActive,
        DomainEventKind::LiveStreamDisconnected,
        DomainEventKind::LiveStreamRecording,
        DomainEventKind::LiveStreamStatus,
        DomainEventKind::LiveStreamDisabled,
        DomainEventKind::RecordingReady,
        DomainEventKind::SimulcastTargetUpdated,
        DomainEventKind::SimulatedLiveUpdated,
        DomainEventKind::AssetUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DomainEventKind::LiveStreamIdle => "LIVE_STREAM_IDLE",
            DomainEventKind::LiveStreamActive => "LIVE_STREAM_ACTIVE",
            DomainEventKind::LiveStreamDisconnected => "LIVE_STREAM_DISCONNECTED",
            DomainEventKind::LiveStreamRecording => "LIVE_STREAM_RECORDING",
            DomainEventKind::LiveStreamStatus => "LIVE_STREAM_STATUS",
            DomainEventKind::LiveStreamDisabled => "LIVE_STREAM_DISABLED",
            DomainEventKind::RecordingReady => "RECORDING_READY",
            DomainEventKind::SimulcastTargetUpdated => "SIMULCAST_TARGET_UPDATED",
            DomainEventKind::SimulatedLiveUpdated => "SIMULATED_LIVE_UPDATED",
            DomainEventKind::AssetUpdated => "ASSET_UPDATED",
        }
    }
}

impl fmt::Display for DomainEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change that real-time clients care about
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    /// Carried as the SSE event name, not in the payload
    #[serde(skip)]
    pub kind: DomainEventKind,

    /// LiveEvent document id
    pub id: Option<Uuid>,

    pub external_stream_id: Option<String>,

    pub status: Option<String>,

    pub timestamp: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl DomainEvent {
    pub fn new(kind: DomainEventKind) -> Self {
        Self {
            kind,
            id: None,
            external_stream_id: None,
            status: None,
            timestamp: Utc::now(),
            detail: None,
        }
    }

    pub fn for_live_event(mut self, id: Uuid, external_stream_id: Option<&str>) -> Self {
        self.id = Some(id);
        self.external_stream_id = external_stream_id.map(str::to_string);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// SSE event name for this event
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }
}
