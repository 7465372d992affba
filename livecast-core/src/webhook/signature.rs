//! Mux webhook signature verification
//!
//! Mux signs each delivery with a `mux-signature` header of the form
//! `t=<unix seconds>,v1=<hex hmac-sha256>`. The MAC covers `"{t}.{body}"`
//! keyed with the endpoint's signing secret.

use crate::error::SignatureError;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the provider signature
pub const SIGNATURE_HEADER: &str = "mux-signature";

/// Development-only header that skips verification
pub const BYPASS_HEADER: &str = "x-bypass-signature-verification";

/// Default allowed clock skew between Mux and us
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// Verifies inbound webhook signatures against a shared secret.
///
/// Fails closed: a missing secret rejects everything.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    secret: Option<String>,
    tolerance: Option<Duration>,
}

/// Parsed `mux-signature` header
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

impl SignatureVerifier {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            tolerance: Some(DEFAULT_TOLERANCE),
        }
    }

    /// Set the timestamp tolerance; `None` disables the freshness check
    pub fn with_tolerance(mut self, tolerance: Option<Duration>) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify a header against a body using the current time
    pub fn verify(&self, header: Option<&str>, body: &[u8]) -> Result<(), SignatureError> {
        self.verify_at(header, body, Utc::now())
    }

    /// Verify a header against a body as of `now`
    pub fn verify_at(
        &self,
        header: Option<&str>,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        let secret = self.secret.as_deref().ok_or(SignatureError::MissingSecret)?;
        let header = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(SignatureError::MissingHeader)?;
        let parsed = parse_header(header)?;

        let mac = signed_payload_mac(secret, parsed.timestamp, body)?;
        // verify_slice compares in constant time
        let matched = parsed
            .signatures
            .iter()
            .any(|candidate| mac.clone().verify_slice(candidate).is_ok());
        if !matched {
            return Err(SignatureError::Mismatch);
        }

        if let Some(tolerance) = self.tolerance {
            let skew_secs = (now.timestamp() - parsed.timestamp).abs();
            if skew_secs as u64 > tolerance.as_secs() {
                return Err(SignatureError::TimestampOutOfRange { skew_secs });
            }
        }

        Ok(())
    }
}

/// Produce a `mux-signature` header value for `body` at `timestamp`
pub fn sign(secret: &str, timestamp: i64, body: &[u8]) -> Result<String, SignatureError> {
    let digest = signed_payload_mac(secret, timestamp, body)?
        .finalize()
        .into_bytes();
    Ok(format!("t={},v1={}", timestamp, hex::encode(digest)))
}

fn signed_payload_mac(
    secret: &str,
    timestamp: i64,
    body: &[u8],
) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(mac)
}

fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key.trim() {
            "t" => {
                let t = value.trim().parse::<i64>().map_err(|_| {
                    SignatureError::MalformedHeader(format!("invalid timestamp '{}'", value))
                })?;
                timestamp = Some(t);
            }
            "v1" => {
                if let Ok(bytes) = hex::decode(value.trim()) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| SignatureError::MalformedHeader("missing timestamp".into()))?;
    if signatures.is_empty() {
        return Err(SignatureError::MalformedHeader(
            "no v1 signature present".into(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}
