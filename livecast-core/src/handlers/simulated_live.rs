//! Simulated-live broadcasts (`*.simulcast.*` events)

use super::{missing, HandlerContext, HandlerOutcome};
use crate::error::HandlerError;
use crate::types::{DomainEventKind, LiveEventPatch, SimulatedLiveState, WebhookEvent};
use chrono::Utc;
use tracing::{info, warn};

pub(super) async fn handle(
    ctx: &HandlerContext,
    event: &WebhookEvent,
) -> Result<HandlerOutcome, HandlerError> {
    let stream_id = event
        .live_stream_id()
        .or_else(|| event.data_id())
        .ok_or_else(|| missing(event, "live_stream_id"))?;

    let Some(live_event) = ctx.store.find_by_stream_id(stream_id).await? else {
        warn!(
            stream_id = %stream_id,
            event_type = %event.event_type,
            "No live event for simulated live update"
        );
        return Ok(HandlerOutcome::NoMatchingRecord);
    };

    let status = event.action().to_string();
    let updated = ctx
        .store
        .update(
            live_event.id,
            LiveEventPatch {
                simulated_live: Some(SimulatedLiveState {
                    status: status.clone(),
                    updated_at: Utc::now(),
                }),
                ..Default::default()
            },
        )
        .await?;
    info!(live_event = %updated.id, status = %status, "Simulated live updated");

    ctx.emit(DomainEventKind::SimulatedLiveUpdated, &updated, &status);
    Ok(HandlerOutcome::Applied(DomainEventKind::SimulatedLiveUpdated))
}
