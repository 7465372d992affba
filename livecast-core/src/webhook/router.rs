//! Mapping of provider event types onto handler categories
//!
//! Routing is a total function from the event type string to an
//! [`EventCategory`]. Checks run in a fixed priority order and the first
//! match wins; `simulcast_target` must be tested before the broader
//! `simulcast` check, which in turn precedes the live stream prefix.

use crate::types::WebhookEvent;

/// Lifecycle sub-events of a live stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveStreamEvent {
    Idle,
    Active,
    Disconnected,
    Recording,
    Connected,
    Disabled,
    Enabled,
    /// created, updated, deleted, warning and anything newer
    Other,
}

impl LiveStreamEvent {
    fn from_action(action: &str) -> Self {
        match action {
            "idle" => LiveStreamEvent::Idle,
            "active" => LiveStreamEvent::Active,
            "disconnected" => LiveStreamEvent::Disconnected,
            "recording" => LiveStreamEvent::Recording,
            "connected" => LiveStreamEvent::Connected,
            "disabled" => LiveStreamEvent::Disabled,
            "enabled" => LiveStreamEvent::Enabled,
            _ => LiveStreamEvent::Other,
        }
    }
}

/// Handler category for a webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    SimulcastTarget,
    SimulatedLive,
    LiveStream(LiveStreamEvent),
    /// Asset created/ready for a live stream recording
    Recording,
    Asset,
    Unhandled,
}

impl EventCategory {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::SimulcastTarget => "simulcast_target",
            EventCategory::SimulatedLive => "simulated_live",
            EventCategory::LiveStream(_) => "live_stream",
            EventCategory::Recording => "recording",
            EventCategory::Asset => "asset",
            EventCategory::Unhandled => "unhandled",
        }
    }
}

const LIVE_STREAM_PREFIX: &str = "video.live_stream.";
const ASSET_PREFIX: &str = "video.asset.";
const RECORDING_ASSET_EVENTS: [&str; 3] = [
    "video.asset.created",
    "video.asset.ready",
    "video.asset.live_stream_completed",
];

/// Categorize a parsed webhook
pub fn categorize(event: &WebhookEvent) -> EventCategory {
    categorize_type(&event.event_type, event.live_stream_id().is_some())
}

/// Categorize an event type. `has_live_stream_ref` is whether the payload
/// carries `data.live_stream_id`.
pub fn categorize_type(event_type: &str, has_live_stream_ref: bool) -> EventCategory {
    if event_type.contains("simulcast_target") {
        return EventCategory::SimulcastTarget;
    }
    if event_type.contains("simulcast") {
        return EventCategory::SimulatedLive;
    }
    if let Some(action) = event_type.strip_prefix(LIVE_STREAM_PREFIX) {
        return EventCategory::LiveStream(LiveStreamEvent::from_action(action));
    }
    if has_live_stream_ref && RECORDING_ASSET_EVENTS.contains(&event_type) {
        return EventCategory::Recording;
    }
    if event_type.starts_with(ASSET_PREFIX) {
        return EventCategory::Asset;
    }
    EventCategory::Unhandled
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Every event type the provider documents, pinned to its category
    #[rustfmt::skip]
    const KNOWN: &[(&str, bool, EventCategory)] = &[
        // Live stream lifecycle
        ("video.live_stream.created", false, EventCategory::LiveStream(LiveStreamEvent::Other)),
        ("video.live_stream.connected", false, EventCategory::LiveStream(LiveStreamEvent::Connected)),
        ("video.live_stream.recording", false, EventCategory::LiveStream(LiveStreamEvent::Recording)),
        ("video.live_stream.active", false, EventCategory::LiveStream(LiveStreamEvent::Active)),
        ("video.live_stream.disconnected", false, EventCategory::LiveStream(LiveStreamEvent::Disconnected)),
        ("video.live_stream.idle", false, EventCategory::LiveStream(LiveStreamEvent::Idle)),
        ("video.live_stream.updated", false, EventCategory::LiveStream(LiveStreamEvent::Other)),
        ("video.live_stream.enabled", false, EventCategory::LiveStream(LiveStreamEvent::Enabled)),
        ("video.live_stream.disabled", false, EventCategory::LiveStream(LiveStreamEvent::Disabled)),
        ("video.live_stream.deleted", false, EventCategory::LiveStream(LiveStreamEvent::Other)),
        ("video.live_stream.warning", false, EventCategory::LiveStream(LiveStreamEvent::Other)),
        // Simulcast targets
        ("video.live_stream.simulcast_target.created", false, EventCategory::SimulcastTarget),
        ("video.live_stream.simulcast_target.idle", false, EventCategory::SimulcastTarget),
        ("video.live_stream.simulcast_target.starting", false, EventCategory::SimulcastTarget),
        ("video.live_stream.simulcast_target.broadcasting", false, EventCategory::SimulcastTarget),
        ("video.live_stream.simulcast_target.errored", false, EventCategory::SimulcastTarget),
        ("video.live_stream.simulcast_target.deleted", false, EventCategory::SimulcastTarget),
        ("video.live_stream.simulcast_target.updated", false, EventCategory::SimulcastTarget),
        // Simulated live
        ("video.live_stream.simulcast.started", false, EventCategory::SimulatedLive),
        ("video.live_stream.simulcast.ended", false, EventCategory::SimulatedLive),
        ("video.simulcast.errored", false, EventCategory::SimulatedLive),
        // Recordings
        ("video.asset.created", true, EventCategory::Recording),
        ("video.asset.ready", true, EventCategory::Recording),
        ("video.asset.live_stream_completed", true, EventCategory::Recording),
        // Plain assets
        ("video.asset.created", false, EventCategory::Asset),
        ("video.asset.ready", false, EventCategory::Asset),
        ("video.asset.errored", false, EventCategory::Asset),
        ("video.asset.updated", false, EventCategory::Asset),
        ("video.asset.deleted", false, EventCategory::Asset),
        ("video.asset.deleted", true, EventCategory::Asset),
        ("video.asset.warning", false, EventCategory::Asset),
        ("video.asset.non_standard_input_detected", false, EventCategory::Asset),
        ("video.asset.static_renditions.ready", true, EventCategory::Asset),
        ("video.asset.static_renditions.preparing", false, EventCategory::Asset),
        ("video.asset.static_renditions.deleted", false, EventCategory::Asset),
        ("video.asset.static_renditions.errored", false, EventCategory::Asset),
        ("video.asset.master.ready", false, EventCategory::Asset),
        ("video.asset.master.preparing", false, EventCategory::Asset),
        ("video.asset.master.deleted", false, EventCategory::Asset),
        ("video.asset.master.errored", false, EventCategory::Asset),
        ("video.asset.track.created", false, EventCategory::Asset),
        ("video.asset.track.ready", false, EventCategory::Asset),
        ("video.asset.track.errored", false, EventCategory::Asset),
        ("video.asset.track.deleted", false, EventCategory::Asset),
        // Everything else
        ("video.upload.asset_created", false, EventCategory::Unhandled),
        ("video.upload.cancelled", false, EventCategory::Unhandled),
        ("video.upload.created", false, EventCategory::Unhandled),
        ("video.upload.errored", false, EventCategory::Unhandled),
        ("video.delivery.high_traffic", false, EventCategory::Unhandled),
    ];

    #[test]
    fn test_known_event_types() {
        for (event_type, has_ref, expected) in KNOWN {
            assert_eq!(
                categorize_type(event_type, *has_ref),
                *expected,
                "misrouted {}",
                event_type
            );
        }
    }

    #[test]
    fn test_simulcast_target_checked_before_simulcast() {
        assert_eq!(
            categorize_type("video.live_stream.simulcast_target.broadcasting", false),
            EventCategory::SimulcastTarget
        );
        assert_eq!(
            categorize_type("video.live_stream.simulcast.started", false),
            EventCategory::SimulatedLive
        );
    }

    #[test]
    fn test_categorize_reads_back_reference() {
        let mut data = serde_json::Map::new();
        data.insert("id".into(), "asset_1".into());
        let plain = WebhookEvent::new("video.asset.ready", data.clone());
        assert_eq!(categorize(&plain), EventCategory::Asset);

        data.insert("live_stream_id".into(), "ls_1".into());
        let recording = WebhookEvent::new("video.asset.ready", data);
        assert_eq!(categorize(&recording), EventCategory::Recording);
    }

    proptest! {
        #[test]
        fn prop_live_stream_prefix_always_lifecycle(action in "[a-z_]{1,20}") {
            prop_assume!(!action.contains("simulcast"));
            let event_type = format!("video.live_stream.{}", action);
            let category = categorize_type(&event_type, false);
            prop_assert!(matches!(category, EventCategory::LiveStream(_)));
        }

        #[test]
        fn prop_simulcast_target_wins(
            prefix in "[a-z._]{0,20}",
            suffix in "[a-z._]{0,20}",
            has_ref in any::<bool>()
        ) {
            let event_type = format!("{}simulcast_target{}", prefix, suffix);
            prop_assert_eq!(categorize_type(&event_type, has_ref), EventCategory::SimulcastTarget);
        }
    }
}
