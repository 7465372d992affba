//! Server configuration from environment variables

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Deployment environment. Development relaxes webhook signature checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => anyhow::bail!("Unknown environment '{}'", other),
        }
    }
}

/// HTTP email API settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub environment: Environment,

    /// Directory holding the JSON database
    pub storage_path: PathBuf,

    /// Comma-separated origins, `*` for any, unset for localhost defaults
    pub cors_origins: Option<String>,

    /// Shared secret for `mux-signature`. Without it every webhook is rejected.
    pub webhook_secret: Option<String>,

    /// Maximum signature age; `None` disables the check
    pub webhook_tolerance: Option<Duration>,

    pub reconnect_window: Duration,
    pub sse_ping_interval: Duration,
    pub event_bus_capacity: usize,

    /// Unset means emails are only logged
    pub email: Option<EmailConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            environment: Environment::Production,
            storage_path: PathBuf::from("./livecast_data"),
            cors_origins: None,
            webhook_secret: None,
            webhook_tolerance: Some(Duration::from_secs(300)),
            reconnect_window: Duration::from_secs(60),
            sse_ping_interval: Duration::from_secs(30),
            event_bus_capacity: 100,
            email: None,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; unset or empty keys use defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("LIVECAST_BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("Invalid LIVECAST_BIND_ADDR '{}'", addr))?;
        }
        if let Some(env) = get("LIVECAST_ENV") {
            config.environment = env.parse()?;
        }
        if let Some(path) = get("LIVECAST_STORAGE_PATH") {
            config.storage_path = PathBuf::from(path);
        }
        config.cors_origins = get("LIVECAST_CORS_ORIGINS");
        config.webhook_secret = get("MUX_WEBHOOK_SECRET");

        if let Some(secs) = get("MUX_WEBHOOK_TOLERANCE_SECS") {
            let secs = parse_number::<u64>("MUX_WEBHOOK_TOLERANCE_SECS", &secs)?;
            config.webhook_tolerance = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(secs) = get("LIVECAST_RECONNECT_WINDOW_SECS") {
            config.reconnect_window =
                Duration::from_secs(parse_number("LIVECAST_RECONNECT_WINDOW_SECS", &secs)?);
        }
        if let Some(secs) = get("LIVECAST_SSE_PING_SECS") {
            let secs = parse_number::<u64>("LIVECAST_SSE_PING_SECS", &secs)?;
            anyhow::ensure!(secs > 0, "LIVECAST_SSE_PING_SECS must be positive");
            config.sse_ping_interval = Duration::from_secs(secs);
        }
        if let Some(capacity) = get("LIVECAST_EVENT_BUS_CAPACITY") {
            let capacity = parse_number::<usize>("LIVECAST_EVENT_BUS_CAPACITY", &capacity)?;
            anyhow::ensure!(capacity > 0, "LIVECAST_EVENT_BUS_CAPACITY must be positive");
            config.event_bus_capacity = capacity;
        }

        config.email = get("LIVECAST_EMAIL_ENDPOINT").map(|endpoint| EmailConfig {
            endpoint,
            api_key: get("LIVECAST_EMAIL_API_KEY"),
            from: get("LIVECAST_EMAIL_FROM")
                .unwrap_or_else(|| "livecast@localhost".to_string()),
        });

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Path of the JSON database file
    pub fn database_path(&self) -> PathBuf {
        self.storage_path.join("livecast.json")
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} '{}'", key, value))
}
