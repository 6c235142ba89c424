use tracing::warn;

use super::webhook_signature::{
    SignatureError, WebhookSignature, verify_signature, verify_timestamp,
};

const LIVE_SECRET_KEY_PREFIX: &str = "sk_live_";

/// PayMongo credentials plus the webhook verification rules tied to them.
pub struct PaymongoClient {
    secret_key: String,
    webhook_secret: String,
    webhook_max_age_secs: i64,
}

impl PaymongoClient {
    pub fn new(secret_key: String, webhook_secret: String, webhook_max_age_secs: i64) -> Self {
        Self {
            secret_key,
            webhook_secret,
            webhook_max_age_secs,
        }
    }

    /// Live mode is implied by the API key, never by the inbound event.
    pub fn is_live_mode(&self) -> bool {
        self.secret_key.starts_with(LIVE_SECRET_KEY_PREFIX)
    }

    /// Parses the `Paymongo-Signature` header and checks it against `payload`.
    /// A stale timestamp is only logged: a valid signature is still honoured.
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookSignature, SignatureError> {
        let signature = WebhookSignature::parse(signature_header)?;

        if !verify_timestamp(signature.timestamp, self.webhook_max_age_secs) {
            warn!(
                timestamp = signature.timestamp,
                max_age_secs = self.webhook_max_age_secs,
                "paymongo_webhook: signature timestamp outside tolerance; continuing"
            );
        }

        verify_signature(payload, &signature, &self.webhook_secret, self.is_live_mode())?;
        Ok(signature)
    }
}
