use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::email_jobs::InsertEmailJobEntity, value_objects::enums::email_templates::EmailTemplate,
};

/// Body of a queue message. Only points at the stored job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailJobPayload {
    pub email_job_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEmailJobModel {
    pub recipient: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub template: EmailTemplate,
    pub order_id: Option<i64>,
    pub checkout_payment_id: Option<String>,
}

impl NewEmailJobModel {
    pub fn order_confirmation(
        order_id: i64,
        order_number: &str,
        recipient: String,
        cc: Vec<String>,
    ) -> Self {
        Self {
            recipient,
            cc,
            subject: format!("Order Confirmation #{}", order_number),
            template: EmailTemplate::OrderConfirmation,
            order_id: Some(order_id),
            checkout_payment_id: None,
        }
    }

    pub fn payment_confirmation(
        checkout_payment_id: String,
        reference_number: &str,
        recipient: String,
        cc: Vec<String>,
    ) -> Self {
        Self {
            recipient,
            cc,
            subject: format!("Payment Received ({})", reference_number),
            template: EmailTemplate::PaymentConfirmation,
            order_id: None,
            checkout_payment_id: Some(checkout_payment_id),
        }
    }

    pub fn to_entity(&self, queue_id: i64) -> InsertEmailJobEntity {
        InsertEmailJobEntity {
            queue_id,
            recipient: self.recipient.clone(),
            cc: self.cc.clone(),
            subject: self.subject.clone(),
            template_name: self.template.to_string(),
            order_id: self.order_id,
            checkout_payment_id: self.checkout_payment_id.clone(),
            created_at: Utc::now(),
        }
    }
}
