use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use crates::domain::{
    entities::orders::{ConfirmOrderPaymentEntity, OrderEntity},
    repositories::payment_confirmation::PaymentConfirmationRepository,
    value_objects::{
        email_queue::NewEmailJobModel,
        enums::checkout_payment_statuses::CheckoutPaymentStatus,
        payment_confirmation::{ConfirmPaymentOutcome, ConfirmedOrder},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};

use super::email_notification::EmailJobEnqueuer;

#[derive(Debug, Error)]
pub enum PaymentConfirmationError {
    #[error("checkout payment not found for reference number {0}")]
    CheckoutPaymentNotFound(String),
    #[error("order not found for checkout payment {0}")]
    OrderNotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type UseCaseResult<T> = std::result::Result<T, PaymentConfirmationError>;

/// Reaction to a gateway "checkout paid" event.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderPaidHandler: Send + Sync {
    async fn on_order_paid(&self, reference_number: &str) -> UseCaseResult<ConfirmedOrder>;
}

pub struct PaymentConfirmationUseCase<R, E>
where
    R: PaymentConfirmationRepository + Send + Sync + 'static,
    E: EmailJobEnqueuer + 'static,
{
    payment_confirmation_repo: Arc<R>,
    email_queue: Arc<E>,
    order_email_cc: Vec<String>,
}

impl<R, E> PaymentConfirmationUseCase<R, E>
where
    R: PaymentConfirmationRepository + Send + Sync + 'static,
    E: EmailJobEnqueuer + 'static,
{
    pub fn new(
        payment_confirmation_repo: Arc<R>,
        email_queue: Arc<E>,
        order_email_cc: Vec<String>,
    ) -> Self {
        Self {
            payment_confirmation_repo,
            email_queue,
            order_email_cc,
        }
    }

    async fn find_order(&self, checkout_payment_id: &str) -> UseCaseResult<OrderEntity> {
        self.payment_confirmation_repo
            .find_order_by_checkout_payment_id(checkout_payment_id)
            .await?
            .ok_or_else(|| {
                warn!(
                    checkout_payment_id,
                    "payment_confirmation: order not found for checkout payment"
                );
                PaymentConfirmationError::OrderNotFound(checkout_payment_id.to_string())
            })
    }

    /// Runs after commit. A failure here never undoes the confirmation.
    async fn enqueue_order_confirmation(&self, order: &OrderEntity) {
        let job = NewEmailJobModel::order_confirmation(
            order.id,
            &order.order_number,
            order.customer_email.clone(),
            self.order_email_cc.clone(),
        );

        if let Err(err) = self.email_queue.enqueue(job).await {
            error!(
                order_id = order.id,
                order_number = %order.order_number,
                error = ?err,
                "payment_confirmation: failed to enqueue order confirmation email"
            );
        }
    }
}

#[async_trait]
impl<R, E> OrderPaidHandler for PaymentConfirmationUseCase<R, E>
where
    R: PaymentConfirmationRepository + Send + Sync + 'static,
    E: EmailJobEnqueuer + 'static,
{
    async fn on_order_paid(&self, reference_number: &str) -> UseCaseResult<ConfirmedOrder> {
        let checkout_payment = self
            .payment_confirmation_repo
            .find_checkout_payment_by_reference(reference_number)
            .await?
            .ok_or_else(|| {
                warn!(
                    reference_number,
                    "payment_confirmation: checkout payment not found"
                );
                PaymentConfirmationError::CheckoutPaymentNotFound(reference_number.to_string())
            })?;

        let order = self.find_order(&checkout_payment.id).await?;

        if CheckoutPaymentStatus::from_str(&checkout_payment.status)
            == Some(CheckoutPaymentStatus::Paid)
        {
            info!(
                reference_number,
                order_id = order.id,
                "payment_confirmation: payment already confirmed; returning existing order"
            );
            return Ok(ConfirmedOrder::from(&order));
        }

        let confirmed = ConfirmedOrder::from(&order);

        let outcome = self
            .payment_confirmation_repo
            .confirm_order_payment(ConfirmOrderPaymentEntity {
                checkout_payment_id: checkout_payment.id.clone(),
                checkout_id: checkout_payment.checkout_id,
                order_id: order.id,
                paid_at: Utc::now(),
            })
            .await
            .map_err(|err| {
                error!(
                    reference_number,
                    order_id = order.id,
                    error = ?err,
                    "payment_confirmation: confirmation transaction rolled back"
                );
                PaymentConfirmationError::Internal(err)
            })?;

        match outcome {
            ConfirmPaymentOutcome::Confirmed => {
                info!(
                    reference_number,
                    order_id = order.id,
                    order_number = %order.order_number,
                    "payment_confirmation: order confirmed"
                );
                self.enqueue_order_confirmation(&order).await;
            }
            ConfirmPaymentOutcome::AlreadyPaid => {
                info!(
                    reference_number,
                    order_id = order.id,
                    "payment_confirmation: concurrent delivery confirmed first; skipping email"
                );
            }
        }

        Ok(confirmed)
    }
}
