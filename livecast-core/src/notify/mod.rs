//! Notification fan-out: in-app notifications and gated emails
//!
//! Both are side effects of a state transition. Failures are logged and
//! never propagate to the caller.

mod email;
mod template;

pub use email::{EmailSender, HttpMailer, LogMailer, OutgoingEmail};
pub use template::{EmailTemplate, RenderedEmail};

use crate::store::{LiveEventStore, SettingsProvider};
use crate::types::{NewNotification, Notification};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// What happened to a notification email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailOutcome {
    Sent,
    /// Emails are switched off in global settings
    Disabled,
    /// Enabled but no recipient configured
    NoRecipient,
    Failed,
}

/// Creates notifications and sends notification emails
#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn LiveEventStore>,
    settings: Arc<dyn SettingsProvider>,
    mailer: Arc<dyn EmailSender>,
}

impl Notifier {
    pub fn new(
        store: Arc<dyn LiveEventStore>,
        settings: Arc<dyn SettingsProvider>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            store,
            settings,
            mailer,
        }
    }

    /// Persist a notification. Returns `None` if the store refused it.
    pub async fn create_notification(&self, notification: NewNotification) -> Option<Notification> {
        let title = notification.title.clone();
        match self.store.create_notification(notification).await {
            Ok(created) => {
                debug!(
                    notification_id = %created.id,
                    title = %created.title,
                    "Created notification"
                );
                Some(created)
            }
            Err(e) => {
                error!(title = %title, error = %e, "Failed to create notification");
                None
            }
        }
    }

    /// Send an email if notification emails are enabled. Settings are read
    /// fresh on every call; failures are logged and not retried.
    pub async fn send_notification_email(&self, email: &RenderedEmail) -> EmailOutcome {
        let settings = match self.settings.notification_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Could not read notification settings, skipping email");
                return EmailOutcome::Failed;
            }
        };

        if !settings.email_notifications_enabled {
            debug!(subject = %email.subject, "Notification emails disabled");
            return EmailOutcome::Disabled;
        }
        let Some(to) = settings.notification_email.filter(|to| !to.trim().is_empty()) else {
            warn!(subject = %email.subject, "Notification emails enabled but no recipient set");
            return EmailOutcome::NoRecipient;
        };

        let outgoing = OutgoingEmail {
            to,
            subject: email.subject.clone(),
            text: email.text.clone(),
            html: email.html.clone(),
        };
        match self.mailer.send(&outgoing).await {
            Ok(()) => {
                debug!(to = %outgoing.to, subject = %outgoing.subject, "Sent notification email");
                EmailOutcome::Sent
            }
            Err(e) => {
                error!(
                    to = %outgoing.to,
                    subject = %outgoing.subject,
                    error = %e,
                    "Failed to send notification email"
                );
                EmailOutcome::Failed
            }
        }
    }
}
