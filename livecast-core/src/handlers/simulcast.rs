//! Simulcast (restream) target status

use super::{missing, HandlerContext, HandlerOutcome};
use crate::error::HandlerError;
use crate::types::{
    DomainEvent, DomainEventKind, LiveEventPatch, NewNotification, Severity, SimulcastStatus,
    SimulcastTarget, WebhookEvent,
};
use serde_json::json;
use tracing::{info, warn};

pub(super) async fn handle(
    ctx: &HandlerContext,
    event: &WebhookEvent,
) -> Result<HandlerOutcome, HandlerError> {
    let target_id = event.data_id().ok_or_else(|| missing(event, "id"))?;

    let live_event = match event.live_stream_id() {
        Some(stream_id) => ctx.store.find_by_stream_id(stream_id).await?,
        None => None,
    };
    let live_event = match live_event {
        Some(found) => Some(found),
        None => ctx.store.find_by_simulcast_target(target_id).await?,
    };
    let Some(live_event) = live_event else {
        warn!(target_id = %target_id, "No live event for simulcast target");
        return Ok(HandlerOutcome::NoMatchingRecord);
    };

    let action = event.action();
    let mut targets = live_event.simulcast_targets.clone();
    let position = targets.iter().position(|t| t.id == target_id);
    let url = event.data_str("url").map(str::to_string);

    let status = if action == "deleted" {
        if let Some(index) = position {
            targets.remove(index);
        }
        None
    } else {
        let status = SimulcastStatus::from_event_suffix(action)
            .or_else(|| event.data_str("status").and_then(SimulcastStatus::from_event_suffix))
            .or_else(|| position.map(|i| targets[i].status))
            .unwrap_or_default();
        match position {
            Some(index) => {
                let target = &mut targets[index];
                target.status = status;
                if url.is_some() {
                    target.url = url;
                }
            }
            None => targets.push(SimulcastTarget {
                id: target_id.to_string(),
                url,
                status,
            }),
        }
        Some(status)
    };

    let updated = ctx
        .store
        .update(
            live_event.id,
            LiveEventPatch {
                simulcast_targets: Some(targets),
                ..Default::default()
            },
        )
        .await?;
    let status_str = status.map_or("deleted", |s| s.as_str());
    info!(
        live_event = %updated.id,
        target_id = %target_id,
        status = status_str,
        "Simulcast target updated"
    );

    if status == Some(SimulcastStatus::Errored) {
        ctx.notifier
            .create_notification(
                NewNotification::new(
                    "Simulcast target error",
                    format!(
                        "Restreaming \"{}\" to target {} failed.",
                        updated.title, target_id
                    ),
                    Severity::Error,
                )
                .related_to(updated.id),
            )
            .await;
    }

    ctx.bus.emit(
        DomainEvent::new(DomainEventKind::SimulcastTargetUpdated)
            .for_live_event(updated.id, updated.mux_live_stream_id.as_deref())
            .with_status(status_str)
            .with_detail(json!({ "targetId": target_id })),
    );
    Ok(HandlerOutcome::Applied(DomainEventKind::SimulcastTargetUpdated))
}

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::*;
    use crate::store::LiveEventStore;
    use crate::types::LiveEvent;
    use uuid::Uuid;

    async fn seeded() -> (Harness, Uuid) {
        let h = Harness::new();
        let event = h
            .store
            .insert(LiveEvent::new("Restreamed").with_stream_id("ls_1"))
            .await
            .unwrap();
        (h, event.id)
    }

    async fn targets(h: &Harness, id: Uuid) -> Vec<SimulcastTarget> {
        h.store
            .find_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .simulcast_targets
    }

    #[tokio::test]
    async fn test_target_lifecycle() {
        let (h, id) = seeded().await;

        h.dispatch(
            "video.live_stream.simulcast_target.created",
            json!({ "id": "st_1", "live_stream_id": "ls_1", "url": "rtmp://a.example/live" }),
        )
        .await;
        let stored = targets(&h, id).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, SimulcastStatus::Idle);
        assert_eq!(stored[0].url.as_deref(), Some("rtmp://a.example/live"));

        // Later events may omit live_stream_id; the target id still resolves
        let outcome = h
            .dispatch(
                "video.live_stream.simulcast_target.broadcasting",
                json!({ "id": "st_1" }),
            )
            .await;
        assert_eq!(
            outcome,
            HandlerOutcome::Applied(DomainEventKind::SimulcastTargetUpdated)
        );
        let stored = targets(&h, id).await;
        assert_eq!(stored[0].status, SimulcastStatus::Broadcasting);
        assert_eq!(stored[0].url.as_deref(), Some("rtmp://a.example/live"));

        h.dispatch(
            "video.live_stream.simulcast_target.deleted",
            json!({ "id": "st_1", "live_stream_id": "ls_1" }),
        )
        .await;
        assert!(targets(&h, id).await.is_empty());
    }

    #[tokio::test]
    async fn test_errored_creates_notification() {
        let (h, id) = seeded().await;
        let mut rx = h.bus.subscribe();

        h.dispatch(
            "video.live_stream.simulcast_target.errored",
            json!({ "id": "st_1", "live_stream_id": "ls_1" }),
        )
        .await;
        assert_eq!(targets(&h, id).await[0].status, SimulcastStatus::Errored);

        let notifications = h.store.list_notifications().await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].severity, Severity::Error);

        let emitted = rx.try_recv().unwrap();
        assert_eq!(emitted.kind, DomainEventKind::SimulcastTargetUpdated);
        assert_eq!(emitted.status.as_deref(), Some("errored"));
        assert_eq!(emitted.detail.unwrap()["targetId"], "st_1");
    }

    #[tokio::test]
    async fn test_unknown_target() {
        let h = Harness::new();
        let outcome = h
            .dispatch(
                "video.live_stream.simulcast_target.starting",
                json!({ "id": "st_9" }),
            )
            .await;
        assert_eq!(outcome, HandlerOutcome::NoMatchingRecord);
    }
}
