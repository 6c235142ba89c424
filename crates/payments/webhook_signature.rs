//! PayMongo webhook signature header: `t=<unix seconds>,te=<hex hmac>` in test
//! mode or `t=<unix seconds>,li=<hex hmac>` in live mode.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid webhook signature: {0}")]
    SignatureInvalid(&'static str),
    #[error("webhook secret is required")]
    SecretRequired,
}

/// Exactly one of `test_signature` / `live_signature` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSignature {
    pub timestamp: i64,
    pub test_signature: String,
    pub live_signature: String,
}

impl WebhookSignature {
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        let header = header.trim();
        if header.is_empty() {
            return Err(SignatureError::SignatureInvalid("header is empty"));
        }

        let mut timestamp: Option<&str> = None;
        let mut test_signature: Option<&str> = None;
        let mut live_signature: Option<&str> = None;

        for segment in header.split(',') {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            match key.trim() {
                "t" => timestamp = Some(value.trim()),
                "te" => test_signature = Some(value.trim()),
                "li" => live_signature = Some(value.trim()),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or(SignatureError::SignatureInvalid("timestamp is missing"))?
            .parse::<i64>()
            .map_err(|_| SignatureError::SignatureInvalid("timestamp is not numeric"))?;
        if timestamp <= 0 {
            return Err(SignatureError::SignatureInvalid("timestamp must be positive"));
        }

        let (test_signature, live_signature) = match (test_signature, live_signature) {
            (Some(_), Some(_)) => {
                return Err(SignatureError::SignatureInvalid(
                    "both test and live signatures present",
                ));
            }
            (Some(te), None) if !te.is_empty() => (te.to_string(), String::new()),
            (None, Some(li)) if !li.is_empty() => (String::new(), li.to_string()),
            _ => return Err(SignatureError::SignatureInvalid("signature is missing")),
        };

        Ok(Self {
            timestamp,
            test_signature,
            live_signature,
        })
    }

    pub fn is_live(&self) -> bool {
        !self.live_signature.is_empty()
    }

    fn signature_for_mode(&self, is_live_mode: bool) -> &str {
        if is_live_mode {
            &self.live_signature
        } else {
            &self.test_signature
        }
    }
}

/// True iff the signature was produced within the last `max_age_seconds`.
pub fn verify_timestamp(timestamp: i64, max_age_seconds: i64) -> bool {
    verify_timestamp_at(timestamp, max_age_seconds, Utc::now().timestamp())
}

pub fn verify_timestamp_at(timestamp: i64, max_age_seconds: i64, now: i64) -> bool {
    match now.checked_sub(timestamp) {
        Some(age) => (0..=max_age_seconds).contains(&age),
        None => false,
    }
}

pub fn verify_signature(
    payload: &[u8],
    signature: &WebhookSignature,
    secret: &str,
    is_live_mode: bool,
) -> Result<(), SignatureError> {
    let mac = signed_mac(payload, signature.timestamp, secret)?;

    let expected = signature.signature_for_mode(is_live_mode);
    if expected.is_empty() {
        return Err(SignatureError::SignatureInvalid(
            "no signature for the configured mode",
        ));
    }
    let expected = hex::decode(expected)
        .map_err(|_| SignatureError::SignatureInvalid("signature is not hex"))?;

    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::SignatureInvalid("signature mismatch"))
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`, as the gateway computes it.
pub fn compute_signature(
    payload: &[u8],
    timestamp: i64,
    secret: &str,
) -> Result<String, SignatureError> {
    let mac = signed_mac(payload, timestamp, secret)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn signed_mac(payload: &[u8], timestamp: i64, secret: &str) -> Result<HmacSha256, SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::SecretRequired);
    }
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::SecretRequired)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}
