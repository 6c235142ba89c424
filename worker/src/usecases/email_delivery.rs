use std::sync::Arc;

use async_trait::async_trait;
use crates::domain::{
    entities::{
        checkout_payments::CheckoutPaymentEntity, email_jobs::EmailJobEntity,
        order_lines::OrderLineEntity, orders::OrderEntity,
    },
    repositories::{
        email_jobs::EmailJobRepository, mailer::MailSender,
        order_notifications::OrderNotificationRepository,
    },
    value_objects::{email_queue::EmailJobPayload, enums::email_templates::EmailTemplate},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum EmailDeliveryError {
    #[error("invalid queue payload: {0}")]
    InvalidPayload(String),
    #[error("email job {0} not found")]
    EmailJobNotFound(i64),
    #[error("{0} not found")]
    NotFound(String),
    #[error("unknown email template: {0}")]
    UnknownTemplate(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type UseCaseResult<T> = std::result::Result<T, EmailDeliveryError>;

/// Consumer side of one queue message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailDelivery: Send + Sync {
    /// Sends the email a queue message points at; returns the email job ID.
    async fn deliver(&self, message: &Value) -> UseCaseResult<i64>;
}

pub struct EmailDeliveryUseCase<J, O, M>
where
    J: EmailJobRepository + Send + Sync + 'static,
    O: OrderNotificationRepository + Send + Sync + 'static,
    M: MailSender + 'static,
{
    email_job_repo: Arc<J>,
    order_notification_repo: Arc<O>,
    mailer: Arc<M>,
}

impl<J, O, M> EmailDeliveryUseCase<J, O, M>
where
    J: EmailJobRepository + Send + Sync + 'static,
    O: OrderNotificationRepository + Send + Sync + 'static,
    M: MailSender + 'static,
{
    pub fn new(email_job_repo: Arc<J>, order_notification_repo: Arc<O>, mailer: Arc<M>) -> Self {
        Self {
            email_job_repo,
            order_notification_repo,
            mailer,
        }
    }

    async fn order_confirmation_data(&self, job: &EmailJobEntity) -> UseCaseResult<Value> {
        let order_id = job.order_id.ok_or_else(|| {
            EmailDeliveryError::NotFound(format!("order reference on email job {}", job.queue_id))
        })?;

        let order = self
            .order_notification_repo
            .find_order_by_id(order_id)
            .await?
            .ok_or_else(|| EmailDeliveryError::NotFound(format!("order {order_id}")))?;
        let lines = self.order_notification_repo.find_order_lines(order_id).await?;

        Ok(order_confirmation_data(&order, &lines))
    }

    async fn payment_confirmation_data(&self, job: &EmailJobEntity) -> UseCaseResult<Value> {
        let checkout_payment_id = job.checkout_payment_id.as_deref().ok_or_else(|| {
            EmailDeliveryError::NotFound(format!(
                "checkout payment reference on email job {}",
                job.queue_id
            ))
        })?;

        let checkout_payment = self
            .order_notification_repo
            .find_checkout_payment_by_id(checkout_payment_id)
            .await?
            .ok_or_else(|| {
                EmailDeliveryError::NotFound(format!("checkout payment {checkout_payment_id}"))
            })?;

        Ok(payment_confirmation_data(&checkout_payment))
    }
}

#[async_trait]
impl<J, O, M> EmailDelivery for EmailDeliveryUseCase<J, O, M>
where
    J: EmailJobRepository + Send + Sync + 'static,
    O: OrderNotificationRepository + Send + Sync + 'static,
    M: MailSender + 'static,
{
    async fn deliver(&self, message: &Value) -> UseCaseResult<i64> {
        let EmailJobPayload { email_job_id } = serde_json::from_value(message.clone())
            .map_err(|err| EmailDeliveryError::InvalidPayload(err.to_string()))?;

        let job = self
            .email_job_repo
            .find_email_job_by_id(email_job_id)
            .await?
            .ok_or(EmailDeliveryError::EmailJobNotFound(email_job_id))?;

        let data = match EmailTemplate::from_str(&job.template_name) {
            Some(EmailTemplate::OrderConfirmation) => self.order_confirmation_data(&job).await?,
            Some(EmailTemplate::PaymentConfirmation) => {
                self.payment_confirmation_data(&job).await?
            }
            None => {
                warn!(
                    email_job_id,
                    template_name = %job.template_name,
                    "email_delivery: unknown template"
                );
                return Err(EmailDeliveryError::UnknownTemplate(job.template_name));
            }
        };

        self.mailer
            .send_template_email(&job.recipient, &job.cc, &job.subject, &job.template_name, data)
            .await?;

        info!(
            email_job_id,
            template_name = %job.template_name,
            "email_delivery: email sent"
        );
        Ok(email_job_id)
    }
}

fn order_confirmation_data(order: &OrderEntity, lines: &[OrderLineEntity]) -> Value {
    let items = lines
        .iter()
        .map(|line| {
            json!({
                "product_name": line.product_name,
                "variant_name": line.variant_name,
                "quantity": line.quantity,
                "unit_price": format_minor(line.unit_price_minor),
                "line_total": format_minor(line.line_total_minor),
            })
        })
        .collect::<Vec<_>>();

    json!({
        "order_number": order.order_number,
        "customer_name": order.customer_name,
        "customer_email": order.customer_email,
        "items": items,
        "shipping_address": {
            "line1": order.address_line1,
            "line2": order.address_line2,
            "city": order.city,
            "province": order.province,
            "postal_code": order.postal_code,
            "country": order.country,
        },
        "subtotal": format_minor(order.subtotal_minor),
        "shipping_fee": format_minor(order.shipping_fee_minor),
        "total": format_minor(order.total_minor),
        "currency": order.currency,
        "paid_at": order.paid_at.map(|paid_at| paid_at.to_rfc3339()),
    })
}

fn payment_confirmation_data(checkout_payment: &CheckoutPaymentEntity) -> Value {
    json!({
        "reference_number": checkout_payment.reference_number,
        "amount": format_minor(checkout_payment.amount_minor),
        "currency": checkout_payment.currency,
        "payment_method": checkout_payment.payment_method_used,
        "status": checkout_payment.status,
    })
}

/// 150050 -> "1500.50"
fn format_minor(amount_minor: i64) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
