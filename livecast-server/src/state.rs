//! Application state

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use livecast_core::handlers::{HandlerContext, WebhookDispatcher};
use livecast_core::notify::{EmailSender, HttpMailer, LogMailer, Notifier};
use livecast_core::store::{JsonFileStore, LiveEventStore, SettingsProvider};
use livecast_core::{ConnectionManager, EventBus, SignatureVerifier};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,

    /// Live events, notifications and assets
    pub store: Arc<dyn LiveEventStore>,

    /// Global notification settings
    pub settings: Arc<dyn SettingsProvider>,

    pub verifier: SignatureVerifier,

    pub dispatcher: WebhookDispatcher,

    /// Domain events for SSE clients
    pub bus: EventBus,

    /// Open SSE connections
    pub connections: ConnectionManager,
}

impl AppState {
    /// Create application state backed by the JSON database under the
    /// configured storage path
    pub async fn new(config: ServerConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.storage_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to create storage directory {}",
                    config.storage_path.display()
                )
            })?;

        let store = JsonFileStore::open(config.database_path())
            .await
            .context("Failed to open live event database")?;

        let mailer: Arc<dyn EmailSender> = match &config.email {
            Some(email) => Arc::new(
                HttpMailer::new(&email.endpoint, email.api_key.clone(), &email.from)
                    .context("Failed to build email client")?,
            ),
            None => {
                tracing::info!(
                    "No email endpoint configured, notification emails will only be logged"
                );
                Arc::new(LogMailer)
            }
        };

        Ok(Self::with_store(config, Arc::new(store), mailer))
    }

    /// Assemble state around an existing store and mailer
    pub fn with_store<S>(config: ServerConfig, store: Arc<S>, mailer: Arc<dyn EmailSender>) -> Self
    where
        S: LiveEventStore + SettingsProvider + 'static,
    {
        let verifier = SignatureVerifier::new(config.webhook_secret.clone())
            .with_tolerance(config.webhook_tolerance);
        if !verifier.has_secret() {
            tracing::warn!("MUX_WEBHOOK_SECRET is not set, all webhooks will be rejected");
        }
        let bus = EventBus::new(config.event_bus_capacity);
        let notifier = Notifier::new(store.clone(), store.clone(), mailer);
        let dispatcher = WebhookDispatcher::new(HandlerContext {
            store: store.clone(),
            notifier,
            bus: bus.clone(),
            reconnect_window: config.reconnect_window,
        });

        Self {
            config: Arc::new(config),
            store: store.clone(),
            settings: store,
            verifier,
            dispatcher,
            bus,
            connections: ConnectionManager::new(),
        }
    }
}
