//! In-app notifications and global notification settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity shown alongside a notification in the admin UI
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A persisted, user-facing alert. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub related_live_event: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub related_live_event: Option<Uuid>,
}

impl NewNotification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            related_live_event: None,
        }
    }

    pub fn related_to(mut self, live_event: Uuid) -> Self {
        self.related_live_event = Some(live_event);
        self
    }

    /// Stamp an id and creation time
    pub fn into_notification(self) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            title: self.title,
            message: self.message,
            severity: self.severity,
            related_live_event: self.related_live_event,
            created_at: Utc::now(),
        }
    }
}

/// Global settings that gate notification emails
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    /// Send emails for stream lifecycle changes
    #[serde(default)]
    pub email_notifications_enabled: bool,

    /// Recipient of notification emails
    pub notification_email: Option<String>,
}
