//! Webhook signature handling
//!
//! Signatures are HMAC-SHA256 over `"<unix timestamp>.<payload>"`, sent as
//! `t=<timestamp>,sha256=<hex digest>`.

use crate::{NotifyError, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature on outbound webhooks.
pub const SIGNATURE_HEADER: &str = "X-Doctriage-Signature";

const ALGORITHM: &str = "sha256";

fn compute_signature(secret: &Secret<String>, timestamp: i64, payload: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|e| NotifyError::SignatureVerificationFailed(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Webhook signer for generating signatures
pub struct WebhookSigner {
    secret: Secret<String>,
}

impl WebhookSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Secret::new(secret.into()),
        }
    }

    /// Signature header value for `payload` at `timestamp`
    pub fn sign(&self, payload: &[u8], timestamp: DateTime<Utc>) -> Result<String> {
        let ts = timestamp.timestamp();
        let signature = compute_signature(&self.secret, ts, payload)?;
        Ok(format!("t={},{}={}", ts, ALGORITHM, signature))
    }

    pub fn sign_now(&self, payload: &[u8]) -> Result<String> {
        self.sign(payload, Utc::now())
    }
}

impl std::fmt::Debug for WebhookSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSigner")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Webhook verifier for receivers of signed notifications
pub struct WebhookVerifier {
    secret: Secret<String>,
    /// Accepted clock skew in seconds
    tolerance_seconds: i64,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Secret::new(secret.into()),
            tolerance_seconds: 300,
        }
    }

    pub fn with_tolerance(mut self, seconds: i64) -> Self {
        self.tolerance_seconds = seconds;
        self
    }

    /// Verify a signature header against `payload`
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<()> {
        let (timestamp, signatures) = parse_signature_header(signature_header)?;

        let diff = (Utc::now().timestamp() - timestamp).abs();
        if diff > self.tolerance_seconds {
            return Err(NotifyError::SignatureVerificationFailed(format!(
                "Timestamp too old: {} seconds difference",
                diff
            )));
        }

        let expected = compute_signature(&self.secret, timestamp, payload)?;
        let matched = signatures
            .iter()
            .any(|(alg, sig)| alg == ALGORITHM && constant_time_compare(sig, &expected));

        if matched {
            Ok(())
        } else {
            Err(NotifyError::SignatureVerificationFailed(
                "No matching signature found".to_string(),
            ))
        }
    }
}

fn parse_signature_header(header: &str) -> Result<(i64, Vec<(String, String)>)> {
    let invalid = || NotifyError::SignatureVerificationFailed("Invalid signature format".into());

    let mut timestamp: Option<i64> = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part.trim().split_once('=').ok_or_else(invalid)?;
        if key == "t" {
            timestamp = Some(value.parse().map_err(|_| {
                NotifyError::SignatureVerificationFailed("Invalid timestamp".to_string())
            })?);
        } else {
            signatures.push((key.to_string(), value.to_string()));
        }
    }

    let ts = timestamp.ok_or_else(|| {
        NotifyError::SignatureVerificationFailed("Missing timestamp".to_string())
    })?;

    Ok((ts, signatures))
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
