//! Store persisted as a single JSON document on the local filesystem

use super::{Database, LiveEventStore, SettingsProvider, StoreResult};
use crate::error::StoreError;
use crate::types::{
    LiveEvent, LiveEventPatch, NewNotification, Notification, NotificationSettings, VideoAsset,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

/// JSON file store. Every mutation rewrites the file atomically.
pub struct JsonFileStore {
    path: PathBuf,
    db: RwLock<Database>,
}

impl JsonFileStore {
    /// Open the database at `path`; a missing file starts empty
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let db = load(&path).await?;
        Ok(Self {
            path,
            db: RwLock::new(db),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against a copy of the database and commit it only once the
    /// copy has been written to disk.
    ///
    /// Every write clones the whole document and rewrites the file, so cost
    /// grows with the database. Notifications are capped at
    /// [`MAX_NOTIFICATIONS`](super::MAX_NOTIFICATIONS) to keep that bounded;
    /// a larger deployment wants a real database behind [`LiveEventStore`].
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Database) -> StoreResult<T> + Send,
    ) -> StoreResult<T> {
        let mut db = self.db.write().await;
        let mut next = db.clone();
        let out = f(&mut next)?;
        save(&self.path, &next).await?;
        *db = next;
        Ok(out)
    }
}

async fn load(path: &Path) -> StoreResult<Database> {
    // Read file directly, handle NotFound as empty database
    match tokio::fs::read_to_string(path).await {
        Ok(data) => {
            serde_json::from_str(&data).map_err(|e| StoreError::BackendError(e.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Database::default()),
        Err(e) => Err(StoreError::Unavailable(e.to_string())),
    }
}

/// Writes to a temp file then renames to avoid partial writes
async fn save(path: &Path, db: &Database) -> StoreResult<()> {
    let data =
        serde_json::to_string_pretty(db).map_err(|e| StoreError::BackendError(e.to_string()))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    }

    // Temp file in same directory (same filesystem for rename)
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &data)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))
}

#[async_trait]
impl LiveEventStore for JsonFileStore {
    async fn find_by_stream_id(&self, stream_id: &str) -> StoreResult<Option<LiveEvent>> {
        Ok(self.db.read().await.find_by_stream_id(stream_id))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<LiveEvent>> {
        Ok(self.db.read().await.live_events.get(&id).cloned())
    }

    async fn find_by_simulcast_target(&self, target_id: &str) -> StoreResult<Option<LiveEvent>> {
        Ok(self.db.read().await.find_by_simulcast_target(target_id))
    }

    async fn list(&self) -> StoreResult<Vec<LiveEvent>> {
        Ok(self.db.read().await.list())
    }

    async fn insert(&self, event: LiveEvent) -> StoreResult<LiveEvent> {
        self.mutate(move |db| db.insert(event)).await
    }

    async fn update(&self, id: Uuid, patch: LiveEventPatch) -> StoreResult<LiveEvent> {
        self.mutate(move |db| db.update(id, patch)).await
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<Notification> {
        self.mutate(move |db| Ok(db.create_notification(notification)))
            .await
    }

    async fn list_notifications(&self) -> StoreResult<Vec<Notification>> {
        Ok(self.db.read().await.list_notifications())
    }

    async fn upsert_asset(&self, asset: VideoAsset) -> StoreResult<()> {
        self.mutate(move |db| {
            db.assets.insert(asset.asset_id.clone(), asset);
            Ok(())
        })
        .await
    }

    async fn find_asset(&self, asset_id: &str) -> StoreResult<Option<VideoAsset>> {
        Ok(self.db.read().await.assets.get(asset_id).cloned())
    }
}

#[async_trait]
impl SettingsProvider for JsonFileStore {
    async fn notification_settings(&self) -> StoreResult<NotificationSettings> {
        Ok(self.db.read().await.settings.clone())
    }

    async fn update_notification_settings(
        &self,
        settings: NotificationSettings,
    ) -> StoreResult<NotificationSettings> {
        self.mutate(move |db| {
            db.settings = settings.clone();
            Ok(settings)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LiveStreamStatus;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_changes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");

        let id = {
            let store = JsonFileStore::open(&path).await.unwrap();
            let event = store
                .insert(LiveEvent::new("Persistent").with_stream_id("ls_9"))
                .await
                .unwrap();
            store
                .update(
                    event.id,
                    LiveEventPatch::live_status(LiveStreamStatus::Disconnected),
                )
                .await
                .unwrap();
            event.id
        };

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let event = reopened.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(event.live_status, LiveStreamStatus::Disconnected);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).await.unwrap();

        let result = store
            .update(
                Uuid::new_v4(),
                LiveEventPatch::live_status(LiveStreamStatus::Active),
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        assert!(matches!(
            JsonFileStore::open(&path).await,
            Err(StoreError::BackendError(_))
        ));
    }
}
