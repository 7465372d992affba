//! Document store abstraction for live events, notifications and settings

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::types::{
    LiveEvent, LiveEventPatch, NewNotification, Notification, NotificationSettings, VideoAsset,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence for the documents webhook handlers read and mutate.
///
/// Updates are last-write-wins; there is no optimistic concurrency control.
#[async_trait]
pub trait LiveEventStore: Send + Sync {
    /// Find the live event bound to a Mux stream id
    async fn find_by_stream_id(&self, stream_id: &str) -> StoreResult<Option<LiveEvent>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<LiveEvent>>;

    /// Find the live event owning a simulcast target
    async fn find_by_simulcast_target(&self, target_id: &str) -> StoreResult<Option<LiveEvent>>;

    /// All live events, most recently created first
    async fn list(&self) -> StoreResult<Vec<LiveEvent>>;

    /// Insert a new live event. Stream ids must be unique.
    async fn insert(&self, event: LiveEvent) -> StoreResult<LiveEvent>;

    /// Apply a patch and return the updated document
    async fn update(&self, id: Uuid, patch: LiveEventPatch) -> StoreResult<LiveEvent>;

    async fn create_notification(&self, notification: NewNotification)
        -> StoreResult<Notification>;

    /// All notifications, newest first
    async fn list_notifications(&self) -> StoreResult<Vec<Notification>>;

    async fn upsert_asset(&self, asset: VideoAsset) -> StoreResult<()>;

    async fn find_asset(&self, asset_id: &str) -> StoreResult<Option<VideoAsset>>;
}

/// Reader for global settings. Values are fetched fresh on every call.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn notification_settings(&self) -> StoreResult<NotificationSettings>;

    async fn update_notification_settings(
        &self,
        settings: NotificationSettings,
    ) -> StoreResult<NotificationSettings>;
}

/// Notifications kept per store; older ones are dropped on insert
pub const MAX_NOTIFICATIONS: usize = 500;

/// Everything a store holds, serializable as one document
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub live_events: HashMap<Uuid, LiveEvent>,

    #[serde(default)]
    pub notifications: Vec<Notification>,

    #[serde(default)]
    pub assets: HashMap<String, VideoAsset>,

    #[serde(default)]
    pub settings: NotificationSettings,
}

impl Database {
    fn find_by_stream_id(&self, stream_id: &str) -> Option<LiveEvent> {
        self.live_events
            .values()
            .find(|e| e.mux_live_stream_id.as_deref() == Some(stream_id))
            .cloned()
    }

    fn find_by_simulcast_target(&self, target_id: &str) -> Option<LiveEvent> {
        self.live_events
            .values()
            .find(|e| e.simulcast_targets.iter().any(|t| t.id == target_id))
            .cloned()
    }

    fn list(&self) -> Vec<LiveEvent> {
        let mut events: Vec<LiveEvent> = self.live_events.values().cloned().collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events
    }

    fn insert(&mut self, event: LiveEvent) -> StoreResult<LiveEvent> {
        if self.live_events.contains_key(&event.id) {
            return Err(StoreError::Conflict(format!("live event {}", event.id)));
        }
        if let Some(stream_id) = event.mux_live_stream_id.as_deref() {
            if self.find_by_stream_id(stream_id).is_some() {
                return Err(StoreError::Conflict(format!(
                    "stream {} already bound",
                    stream_id
                )));
            }
        }
        self.live_events.insert(event.id, event.clone());
        Ok(event)
    }

    fn update(&mut self, id: Uuid, patch: LiveEventPatch) -> StoreResult<LiveEvent> {
        let event = self
            .live_events
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("live event {}", id)))?;
        event.apply(patch);
        Ok(event.clone())
    }

    fn create_notification(&mut self, notification: NewNotification) -> Notification {
        let notification = notification.into_notification();
        self.notifications.push(notification.clone());
        if self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
        notification
    }

    fn list_notifications(&self) -> Vec<Notification> {
        let mut notifications = self.notifications.clone();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LiveStreamStatus, Severity, SimulcastStatus, SimulcastTarget};

    #[test]
    fn test_duplicate_stream_id_rejected() {
        let mut db = Database::default();
        db.insert(LiveEvent::new("First").with_stream_id("ls_1"))
            .unwrap();
        let result = db.insert(LiveEvent::new("Second").with_stream_id("ls_1"));
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn test_update_missing_event() {
        let mut db = Database::default();
        let result = db.update(
            Uuid::new_v4(),
            LiveEventPatch::live_status(LiveStreamStatus::Active),
        );
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_find_by_simulcast_target() {
        let mut db = Database::default();
        let mut event = LiveEvent::new("Restreamed");
        event.simulcast_targets.push(SimulcastTarget {
            id: "st_1".to_string(),
            url: None,
            status: SimulcastStatus::Idle,
        });
        let event = db.insert(event).unwrap();

        assert_eq!(db.find_by_simulcast_target("st_1").map(|e| e.id), Some(event.id));
        assert!(db.find_by_simulcast_target("st_2").is_none());
    }

    #[test]
    fn test_notifications_newest_first() {
        let mut db = Database::default();
        let first = db.create_notification(NewNotification::new("a", "first", Severity::Info));
        let mut second = NewNotification::new("b", "second", Severity::Info).into_notification();
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        db.notifications.push(second);

        let listed = db.list_notifications();
        assert_eq!(listed[0].message, "second");
        assert_eq!(listed[1].message, "first");
    }

    #[test]
    fn test_notifications_capped_oldest_dropped() {
        let mut db = Database::default();
        let now = chrono::Utc::now();
        for i in 0..MAX_NOTIFICATIONS {
            let mut notification =
                NewNotification::new("n", format!("#{}", i), Severity::Info).into_notification();
            let age = (MAX_NOTIFICATIONS - i) as i64;
            notification.created_at = now - chrono::Duration::seconds(age);
            db.notifications.push(notification);
        }

        let latest = db.create_notification(NewNotification::new("n", "latest", Severity::Info));
        assert_eq!(db.notifications.len(), MAX_NOTIFICATIONS);
        assert!(db.notifications.iter().all(|n| n.message != "#0"));
        assert_eq!(db.list_notifications()[0].id, latest.id);
    }
}
