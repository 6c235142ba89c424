use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::{
    checkout_payments::CheckoutPaymentEntity, order_lines::OrderLineEntity, orders::OrderEntity,
};

/// Read side used when rendering notification emails.
#[automock]
#[async_trait]
pub trait OrderNotificationRepository {
    async fn find_order_by_id(&self, order_id: i64) -> Result<Option<OrderEntity>>;

    async fn find_order_lines(&self, order_id: i64) -> Result<Vec<OrderLineEntity>>;

    async fn find_checkout_payment_by_id(
        &self,
        checkout_payment_id: &str,
    ) -> Result<Option<CheckoutPaymentEntity>>;
}
