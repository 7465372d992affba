//! Outbound email delivery

use crate::error::NotifyError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// A fully addressed email ready to send
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Delivers emails. Implementations must not retry; callers log failures.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError>;
}

/// Writes emails to the log instead of sending them
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl EmailSender for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        info!(to = %email.to, subject = %email.subject, "Email (log only)");
        Ok(())
    }
}

/// Sends email through a JSON HTTP email API
/// (`POST { from, to, subject, text, html }` with bearer auth)
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        from: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            from: from.into(),
        })
    }

    fn request_body<'a>(&'a self, email: &'a OutgoingEmail) -> SendRequest<'a> {
        SendRequest {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.text,
            html: &email.html,
        }
    }
}

#[async_trait]
impl EmailSender for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(email));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
