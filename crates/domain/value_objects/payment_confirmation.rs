use serde::{Deserialize, Serialize};

use crate::domain::entities::orders::OrderEntity;

/// Identity of an order whose payment has been confirmed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmedOrder {
    pub order_number: String,
    pub order_id: i64,
    pub customer_email: String,
}

impl From<&OrderEntity> for ConfirmedOrder {
    fn from(order: &OrderEntity) -> Self {
        Self {
            order_number: order.order_number.clone(),
            order_id: order.id,
            customer_email: order.customer_email.clone(),
        }
    }
}

/// Result of the confirmation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPaymentOutcome {
    /// This call performed the pending -> paid transition.
    Confirmed,
    /// Another delivery committed the transition first; nothing was written.
    AlreadyPaid,
}
