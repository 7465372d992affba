//! Assets that record a live stream (`video.asset.*` with `live_stream_id`)

use super::{asset, missing, HandlerContext, HandlerOutcome};
use crate::error::HandlerError;
use crate::types::{
    DocumentStatus, DomainEventKind, LiveEventPatch, LiveStreamStatus, WebhookEvent,
};
use tracing::{info, warn};

pub(super) async fn handle(
    ctx: &HandlerContext,
    event: &WebhookEvent,
) -> Result<HandlerOutcome, HandlerError> {
    let asset_id = event.data_id().ok_or_else(|| missing(event, "id"))?;
    let stream_id = event
        .live_stream_id()
        .ok_or_else(|| missing(event, "live_stream_id"))?;

    // Keep the asset record current even when no live event claims it
    asset::record(ctx, event, asset_id).await?;

    let Some(live_event) = ctx.store.find_by_stream_id(stream_id).await? else {
        warn!(
            stream_id = %stream_id,
            asset_id = %asset_id,
            "No live event for recording asset"
        );
        return Ok(HandlerOutcome::NoMatchingRecord);
    };

    let mut patch = LiveEventPatch {
        recording_asset_id: Some(asset_id.to_string()),
        ..Default::default()
    };

    let kind = match event.action() {
        "created" => DomainEventKind::LiveStreamRecording,
        action => {
            if action == "ready" {
                patch.recording_playback_id = event.public_playback_id().map(str::to_string);
            }
            if live_event.live_status == LiveStreamStatus::Idle {
                patch.live_status = Some(LiveStreamStatus::Completed);
                patch.status = Some(DocumentStatus::Ended);
            }
            DomainEventKind::RecordingReady
        }
    };

    let updated = ctx.store.update(live_event.id, patch).await?;
    info!(
        live_event = %updated.id,
        asset_id = %asset_id,
        live_status = %updated.live_status,
        "Recorded asset for live event"
    );
    ctx.emit(kind, &updated, updated.live_status.as_str());
    Ok(HandlerOutcome::Applied(kind))
}

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::*;
    use crate::store::LiveEventStore;
    use crate::types::LiveEvent;
    use serde_json::json;

    async fn seeded() -> (Harness, LiveEvent) {
        let h = Harness::new();
        let event = h
            .store
            .insert(LiveEvent::new("Recorded").with_stream_id("ls_1"))
            .await
            .unwrap();
        (h, event)
    }

    #[tokio::test]
    async fn test_asset_created_links_recording() {
        let (h, event) = seeded().await;
        let outcome = h
            .dispatch(
                "video.asset.created",
                json!({ "id": "asset_1", "live_stream_id": "ls_1", "status": "preparing" }),
            )
            .await;
        assert_eq!(
            outcome,
            HandlerOutcome::Applied(DomainEventKind::LiveStreamRecording)
        );

        let stored = h.store.find_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(stored.recording_asset_id.as_deref(), Some("asset_1"));
        assert!(stored.recording_playback_id.is_none());

        let asset = h.store.find_asset("asset_1").await.unwrap().unwrap();
        assert_eq!(asset.status, "preparing");
        assert_eq!(asset.live_stream_id.as_deref(), Some("ls_1"));
    }

    #[tokio::test]
    async fn test_ready_after_broadcast_completes_event() {
        let (h, event) = seeded().await;
        let outcome = h
            .dispatch(
                "video.asset.ready",
                json!({
                    "id": "asset_1",
                    "live_stream_id": "ls_1",
                    "status": "ready",
                    "playback_ids": [
                        { "id": "pb_signed", "policy": "signed" },
                        { "id": "pb_public", "policy": "public" }
                    ]
                }),
            )
            .await;
        assert_eq!(outcome, HandlerOutcome::Applied(DomainEventKind::RecordingReady));

        let stored = h.store.find_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(stored.recording_playback_id.as_deref(), Some("pb_public"));
        assert_eq!(stored.live_status, LiveStreamStatus::Completed);
        assert_eq!(stored.status, DocumentStatus::Ended);
    }

    #[tokio::test]
    async fn test_ready_while_live_keeps_status() {
        let (h, event) = seeded().await;
        h.dispatch("video.live_stream.active", json!({ "id": "ls_1" }))
            .await;

        h.dispatch(
            "video.asset.ready",
            json!({ "id": "asset_1", "live_stream_id": "ls_1", "status": "ready" }),
        )
        .await;
        let stored = h.store.find_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(stored.live_status, LiveStreamStatus::Active);
        assert_eq!(stored.recording_asset_id.as_deref(), Some("asset_1"));
    }

    #[tokio::test]
    async fn test_live_stream_completed() {
        let (h, event) = seeded().await;
        let outcome = h
            .dispatch(
                "video.asset.live_stream_completed",
                json!({ "id": "asset_1", "live_stream_id": "ls_1" }),
            )
            .await;
        assert_eq!(outcome, HandlerOutcome::Applied(DomainEventKind::RecordingReady));

        let stored = h.store.find_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(stored.live_status, LiveStreamStatus::Completed);
        assert!(stored.recording_playback_id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_stream() {
        let h = Harness::new();
        let outcome = h
            .dispatch(
                "video.asset.ready",
                json!({ "id": "asset_1", "live_stream_id": "ls_missing" }),
            )
            .await;
        assert_eq!(outcome, HandlerOutcome::NoMatchingRecord);
        assert!(h.store.find_asset("asset_1").await.unwrap().is_some());
    }
}
