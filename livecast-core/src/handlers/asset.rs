//! Video asset bookkeeping for `video.asset.*` events

use super::{missing, HandlerContext, HandlerOutcome};
use crate::error::HandlerError;
use crate::types::{DomainEvent, DomainEventKind, VideoAsset, WebhookEvent};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

const ASSET_PREFIX: &str = "video.asset.";

pub(super) async fn handle(
    ctx: &HandlerContext,
    event: &WebhookEvent,
) -> Result<HandlerOutcome, HandlerError> {
    // Sub-resource events (video.asset.track.ready, ...) describe the track,
    // not the asset, and point back to it through data.asset_id
    let nested = is_nested(&event.event_type);
    let asset_id = if nested {
        event.data_str("asset_id")
    } else {
        event.data_id()
    }
    .ok_or_else(|| missing(event, if nested { "asset_id" } else { "id" }))?;

    let asset = record(ctx, event, asset_id).await?;

    ctx.bus.emit(
        DomainEvent::new(DomainEventKind::AssetUpdated)
            .with_status(asset.status.clone())
            .with_detail(json!({
                "assetId": asset.asset_id,
                "event": event.event_type,
                "playbackIds": asset.playback_ids,
            })),
    );
    Ok(HandlerOutcome::Applied(DomainEventKind::AssetUpdated))
}

/// Upsert the stored asset from an asset event and return the new record
pub(super) async fn record(
    ctx: &HandlerContext,
    event: &WebhookEvent,
    asset_id: &str,
) -> Result<VideoAsset, HandlerError> {
    let existing = ctx.store.find_asset(asset_id).await?;
    let nested = is_nested(&event.event_type);

    let status = if event.action() == "deleted" && !nested {
        "deleted".to_string()
    } else if let Some(status) = event.data_str("status").filter(|_| !nested) {
        status.to_string()
    } else if let Some(existing) = &existing {
        existing.status.clone()
    } else {
        "unknown".to_string()
    };

    let mut playback_ids: Vec<String> = event
        .playback_ids()
        .map(|(id, _)| id.to_string())
        .collect();
    if playback_ids.is_empty() {
        if let Some(existing) = &existing {
            playback_ids = existing.playback_ids.clone();
        }
    }

    let asset = VideoAsset {
        asset_id: asset_id.to_string(),
        status,
        playback_ids,
        duration_secs: event
            .data
            .get("duration")
            .and_then(Value::as_f64)
            .or_else(|| existing.as_ref().and_then(|a| a.duration_secs)),
        live_stream_id: event
            .live_stream_id()
            .map(str::to_string)
            .or_else(|| existing.as_ref().and_then(|a| a.live_stream_id.clone())),
        updated_at: Utc::now(),
    };
    debug!(asset_id = %asset.asset_id, status = %asset.status, "Upserting asset");
    ctx.store.upsert_asset(asset.clone()).await?;
    Ok(asset)
}

fn is_nested(event_type: &str) -> bool {
    event_type
        .strip_prefix(ASSET_PREFIX)
        .is_some_and(|rest| rest.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::*;
    use crate::store::LiveEventStore;

    #[test]
    fn test_nested_detection() {
        assert!(is_nested("video.asset.track.ready"));
        assert!(is_nested("video.asset.static_renditions.ready"));
        assert!(!is_nested("video.asset.ready"));
        assert!(!is_nested("video.asset.live_stream_completed"));
    }

    #[tokio::test]
    async fn test_asset_lifecycle() {
        let h = Harness::new();
        let mut rx = h.bus.subscribe();

        let outcome = h
            .dispatch(
                "video.asset.created",
                json!({ "id": "asset_1", "status": "preparing" }),
            )
            .await;
        assert_eq!(outcome, HandlerOutcome::Applied(DomainEventKind::AssetUpdated));

        h.dispatch(
            "video.asset.ready",
            json!({
                "id": "asset_1",
                "status": "ready",
                "duration": 42.5,
                "playback_ids": [{ "id": "pb_1", "policy": "public" }]
            }),
        )
        .await;
        let asset = h.store.find_asset("asset_1").await.unwrap().unwrap();
        assert_eq!(asset.status, "ready");
        assert_eq!(asset.playback_ids, vec!["pb_1".to_string()]);
        assert_eq!(asset.duration_secs, Some(42.5));

        h.dispatch("video.asset.deleted", json!({ "id": "asset_1" }))
            .await;
        let asset = h.store.find_asset("asset_1").await.unwrap().unwrap();
        assert_eq!(asset.status, "deleted");
        assert_eq!(asset.playback_ids, vec!["pb_1".to_string()]);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.kind, DomainEventKind::AssetUpdated);
        assert_eq!(first.status.as_deref(), Some("preparing"));
        assert_eq!(first.detail.unwrap()["assetId"], "asset_1");
    }

    #[tokio::test]
    async fn test_track_event_keeps_asset_status() {
        let h = Harness::new();
        h.dispatch(
            "video.asset.ready",
            json!({ "id": "asset_1", "status": "ready" }),
        )
        .await;

        let outcome = h
            .dispatch(
                "video.asset.track.ready",
                json!({ "id": "track_1", "asset_id": "asset_1", "status": "preparing" }),
            )
            .await;
        assert_eq!(outcome, HandlerOutcome::Applied(DomainEventKind::AssetUpdated));
        let asset = h.store.find_asset("asset_1").await.unwrap().unwrap();
        assert_eq!(asset.status, "ready");
        assert!(h.store.find_asset("track_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_id_fails() {
        let h = Harness::new();
        let outcome = h
            .dispatch("video.asset.errored", json!({ "status": "errored" }))
            .await;
        assert_eq!(outcome, HandlerOutcome::Failed);
    }
}
