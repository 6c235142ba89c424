use std::sync::Arc;

use axum::http::StatusCode;
use crates::{
    domain::value_objects::paymongo_webhook::{PaymongoWebhookEvent, WebhookEventType},
    payments::{
        paymongo_client::PaymongoClient,
        webhook_signature::{SignatureError, WebhookSignature},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};

use super::payment_confirmation::OrderPaidHandler;

#[cfg_attr(test, mockall::automock)]
pub trait PaymentGateway: Send + Sync {
    fn is_live_mode(&self) -> bool;

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookSignature, SignatureError>;
}

impl PaymentGateway for PaymongoClient {
    fn is_live_mode(&self) -> bool {
        self.is_live_mode()
    }

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookSignature, SignatureError> {
        self.verify_webhook_signature(payload, signature_header)
    }
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing Paymongo-Signature header")]
    MissingSignature,
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(String),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature | WebhookError::Signature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, WebhookError>;

/// Verifies inbound gateway webhooks and routes them by event type. Once a
/// payload is verified, downstream failures are logged and never surfaced.
pub struct PaymongoWebhookUseCase<G, H>
where
    G: PaymentGateway + 'static,
    H: OrderPaidHandler + 'static,
{
    gateway: Arc<G>,
    order_paid_handler: Arc<H>,
}

impl<G, H> PaymongoWebhookUseCase<G, H>
where
    G: PaymentGateway + 'static,
    H: OrderPaidHandler + 'static,
{
    pub fn new(gateway: Arc<G>, order_paid_handler: Arc<H>) -> Self {
        Self {
            gateway,
            order_paid_handler,
        }
    }

    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> UseCaseResult<WebhookEventType> {
        let signature_header = signature_header
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                warn!("paymongo_webhook: signature header missing");
                WebhookError::MissingSignature
            })?;

        self.gateway
            .verify_webhook_signature(payload, signature_header)
            .map_err(|err| {
                warn!(
                    error = %err,
                    payload_len = payload.len(),
                    "paymongo_webhook: signature verification failed"
                );
                WebhookError::from(err)
            })?;

        let event: PaymongoWebhookEvent = serde_json::from_slice(payload).map_err(|err| {
            warn!(error = %err, "paymongo_webhook: verified payload is not a valid event");
            WebhookError::InvalidPayload(err.to_string())
        })?;

        let event_type = event.event_type();
        info!(
            event_id = %event.id,
            event_type = %event.type_,
            livemode = event.livemode,
            "paymongo_webhook: event verified"
        );

        if event.livemode != self.gateway.is_live_mode() {
            warn!(
                event_id = %event.id,
                event_livemode = event.livemode,
                configured_livemode = self.gateway.is_live_mode(),
                "paymongo_webhook: event mode differs from configured mode"
            );
        }

        match &event_type {
            WebhookEventType::PaymentPaid => {
                info!(event_id = %event.id, "paymongo_webhook: payment paid");
            }
            WebhookEventType::PaymentFailed => {
                info!(event_id = %event.id, "paymongo_webhook: payment failed");
            }
            WebhookEventType::CheckoutSessionPaymentPaid => {
                self.handle_checkout_session_paid(&event).await;
            }
            WebhookEventType::Unhandled(event_type) => {
                info!(event_id = %event.id, event_type = %event_type, "paymongo_webhook: unhandled event type");
            }
        }

        Ok(event_type)
    }

    async fn handle_checkout_session_paid(&self, event: &PaymongoWebhookEvent) {
        let Some(reference_number) = event.reference_number() else {
            warn!(
                event_id = %event.id,
                "paymongo_webhook: checkout session event has no reference number"
            );
            return;
        };

        match self.order_paid_handler.on_order_paid(&reference_number).await {
            Ok(confirmed) => {
                info!(
                    event_id = %event.id,
                    reference_number = %reference_number,
                    order_id = confirmed.order_id,
                    order_number = %confirmed.order_number,
                    "paymongo_webhook: checkout session payment processed"
                );
            }
            Err(err) => {
                error!(
                    event_id = %event.id,
                    reference_number = %reference_number,
                    error = %err,
                    "paymongo_webhook: failed to confirm order payment"
                );
            }
        }
    }
}
