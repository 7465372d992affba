//! Live stream lifecycle: idle, active, disconnected, recording, connected
//!
//! Transitions are applied in arrival order. Webhooks are not reconciled by
//! sequence number or timestamp, so a late `active` delivered after a newer
//! `disconnected` will overwrite it. This is a known gap.

use super::{missing, HandlerContext, HandlerOutcome};
use crate::error::HandlerError;
use crate::notify::EmailTemplate;
use crate::types::{
    DocumentStatus, DomainEventKind, LiveEvent, LiveEventPatch, LiveStreamStatus, NewNotification,
    Severity, WebhookEvent,
};
use crate::webhook::LiveStreamEvent;
use chrono::Utc;
use minijinja::{context, Value};
use tracing::{debug, info, warn};

pub(super) async fn handle(
    ctx: &HandlerContext,
    event: &WebhookEvent,
    kind: LiveStreamEvent,
) -> Result<HandlerOutcome, HandlerError> {
    if kind == LiveStreamEvent::Other {
        debug!(event_type = %event.event_type, "No lifecycle handling for event");
        return Ok(HandlerOutcome::Ignored);
    }

    let stream_id = event.data_id().ok_or_else(|| missing(event, "id"))?;
    let Some(live_event) = ctx.store.find_by_stream_id(stream_id).await? else {
        warn!(
            stream_id = %stream_id,
            event_type = %event.event_type,
            "No live event for stream, ignoring webhook"
        );
        return Ok(HandlerOutcome::NoMatchingRecord);
    };

    match kind {
        LiveStreamEvent::Idle | LiveStreamEvent::Enabled => {
            let updated = ctx
                .store
                .update(live_event.id, LiveEventPatch::live_status(LiveStreamStatus::Idle))
                .await?;
            ctx.emit(DomainEventKind::LiveStreamIdle, &updated, "idle");
            Ok(HandlerOutcome::Applied(DomainEventKind::LiveStreamIdle))
        }
        LiveStreamEvent::Active => on_active(ctx, &live_event).await,
        LiveStreamEvent::Disconnected => on_disconnected(ctx, &live_event).await,
        LiveStreamEvent::Recording => on_recording(ctx, event, &live_event).await,
        LiveStreamEvent::Connected => {
            // Status update for the UI only, nothing is persisted
            ctx.emit(DomainEventKind::LiveStreamStatus, &live_event, "connected");
            Ok(HandlerOutcome::Applied(DomainEventKind::LiveStreamStatus))
        }
        LiveStreamEvent::Disabled => {
            let updated = ctx
                .store
                .update(
                    live_event.id,
                    LiveEventPatch::live_status(LiveStreamStatus::Disabled),
                )
                .await?;
            ctx.emit(DomainEventKind::LiveStreamDisabled, &updated, "disabled");
            Ok(HandlerOutcome::Applied(DomainEventKind::LiveStreamDisabled))
        }
        LiveStreamEvent::Other => Ok(HandlerOutcome::Ignored),
    }
}

async fn on_active(
    ctx: &HandlerContext,
    live_event: &LiveEvent,
) -> Result<HandlerOutcome, HandlerError> {
    let recovered = live_event.disconnected_at.is_some();
    let updated = ctx
        .store
        .update(
            live_event.id,
            LiveEventPatch {
                live_status: Some(LiveStreamStatus::Active),
                status: Some(DocumentStatus::Active),
                disconnected_at: Some(None),
                ..Default::default()
            },
        )
        .await?;
    info!(live_event = %updated.id, recovered, "Live stream active");

    let message = if recovered {
        format!("\"{}\" reconnected and is live again.", updated.title)
    } else {
        format!("\"{}\" is now live.", updated.title)
    };
    ctx.notifier
        .create_notification(
            NewNotification::new("Live stream started", message, Severity::Success)
                .related_to(updated.id),
        )
        .await;

    send_email(
        ctx,
        EmailTemplate::StreamActive,
        context! {
            title => updated.title.as_str(),
            stream_id => updated.mux_live_stream_id.as_deref().unwrap_or_default()
        },
    )
    .await;

    ctx.emit(DomainEventKind::LiveStreamActive, &updated, "active");
    Ok(HandlerOutcome::Applied(DomainEventKind::LiveStreamActive))
}

async fn on_disconnected(
    ctx: &HandlerContext,
    live_event: &LiveEvent,
) -> Result<HandlerOutcome, HandlerError> {
    let updated = ctx
        .store
        .update(
            live_event.id,
            LiveEventPatch {
                live_status: Some(LiveStreamStatus::Disconnected),
                disconnected_at: Some(Some(Utc::now())),
                ..Default::default()
            },
        )
        .await?;
    warn!(live_event = %updated.id, "Live stream disconnected");

    ctx.notifier
        .create_notification(
            NewNotification::new(
                "Live stream disconnected",
                format!(
                    "The encoder for \"{}\" disconnected. Waiting up to {}s for it to reconnect.",
                    updated.title,
                    ctx.reconnect_window.as_secs()
                ),
                Severity::Warning,
            )
            .related_to(updated.id),
        )
        .await;

    send_email(
        ctx,
        EmailTemplate::StreamDisconnected,
        context! {
            title => updated.title.as_str(),
            stream_id => updated.mux_live_stream_id.as_deref().unwrap_or_default(),
            reconnect_window => ctx.reconnect_window.as_secs()
        },
    )
    .await;

    ctx.emit(DomainEventKind::LiveStreamDisconnected, &updated, "disconnected");
    Ok(HandlerOutcome::Applied(DomainEventKind::LiveStreamDisconnected))
}

/// Render a notification email and hand it to the notifier. Failures are
/// logged only.
async fn send_email(ctx: &HandlerContext, template: EmailTemplate, vars: Value) {
    match template.render(vars) {
        Ok(email) => {
            ctx.notifier.send_notification_email(&email).await;
        }
        Err(e) => warn!(template = template.name(), error = %e, "Failed to render email"),
    }
}

async fn on_recording(
    ctx: &HandlerContext,
    event: &WebhookEvent,
    live_event: &LiveEvent,
) -> Result<HandlerOutcome, HandlerError> {
    let Some(asset_id) = event.active_asset_id() else {
        warn!(
            live_event = %live_event.id,
            "Recording webhook without an asset id, skipping"
        );
        return Ok(HandlerOutcome::Skipped("missing asset id"));
    };

    let updated = ctx
        .store
        .update(
            live_event.id,
            LiveEventPatch {
                recording_asset_id: Some(asset_id.to_string()),
                ..Default::default()
            },
        )
        .await?;
    ctx.emit(
        DomainEventKind::LiveStreamRecording,
        &updated,
        updated.live_status.as_str(),
    );
    Ok(HandlerOutcome::Applied(DomainEventKind::LiveStreamRecording))
}
