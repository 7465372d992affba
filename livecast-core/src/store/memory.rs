//! In-memory store (for testing and ephemeral deployments)

use super::{Database, LiveEventStore, SettingsProvider, StoreResult};
use crate::error::StoreError;
use crate::types::{
    LiveEvent, LiveEventPatch, NewNotification, Notification, NotificationSettings, VideoAsset,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory store provider
#[derive(Default)]
pub struct MemoryStore {
    db: RwLock<Database>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backing database going away
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LiveEventStore for MemoryStore {
    async fn find_by_stream_id(&self, stream_id: &str) -> StoreResult<Option<LiveEvent>> {
        self.check()?;
        Ok(self.db.read().await.find_by_stream_id(stream_id))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<LiveEvent>> {
        self.check()?;
        Ok(self.db.read().await.live_events.get(&id).cloned())
    }

    async fn find_by_simulcast_target(&self, target_id: &str) -> StoreResult<Option<LiveEvent>> {
        self.check()?;
        Ok(self.db.read().await.find_by_simulcast_target(target_id))
    }

    async fn list(&self) -> StoreResult<Vec<LiveEvent>> {
        self.check()?;
        Ok(self.db.read().await.list())
    }

    async fn insert(&self, event: LiveEvent) -> StoreResult<LiveEvent> {
        self.check()?;
        self.db.write().await.insert(event)
    }

    async fn update(&self, id: Uuid, patch: LiveEventPatch) -> StoreResult<LiveEvent> {
        self.check()?;
        self.db.write().await.update(id, patch)
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<Notification> {
        self.check()?;
        Ok(self.db.write().await.create_notification(notification))
    }

    async fn list_notifications(&self) -> StoreResult<Vec<Notification>> {
        self.check()?;
        Ok(self.db.read().await.list_notifications())
    }

    async fn upsert_asset(&self, asset: VideoAsset) -> StoreResult<()> {
        self.check()?;
        self.db
            .write()
            .await
            .assets
            .insert(asset.asset_id.clone(), asset);
        Ok(())
    }

    async fn find_asset(&self, asset_id: &str) -> StoreResult<Option<VideoAsset>> {
        self.check()?;
        Ok(self.db.read().await.assets.get(asset_id).cloned())
    }
}

#[async_trait]
impl SettingsProvider for MemoryStore {
    async fn notification_settings(&self) -> StoreResult<NotificationSettings> {
        self.check()?;
        Ok(self.db.read().await.settings.clone())
    }

    async fn update_notification_settings(
        &self,
        settings: NotificationSettings,
    ) -> StoreResult<NotificationSettings> {
        self.check()?;
        self.db.write().await.settings = settings.clone();
        Ok(settings)
    }
}
