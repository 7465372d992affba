//! Video assets known from Mux asset webhooks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last known state of a Mux video asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoAsset {
    /// Mux asset id
    pub asset_id: String,

    /// Provider status (`preparing`, `ready`, `errored`, `deleted`, ...)
    pub status: String,

    #[serde(default)]
    pub playback_ids: Vec<String>,

    pub duration_secs: Option<f64>,

    /// Set when the asset is the recording of a live stream
    pub live_stream_id: Option<String>,

    pub updated_at: DateTime<Utc>,
}
