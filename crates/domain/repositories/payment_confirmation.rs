use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::{
        checkout_payments::CheckoutPaymentEntity,
        orders::{ConfirmOrderPaymentEntity, OrderEntity},
    },
    value_objects::payment_confirmation::ConfirmPaymentOutcome,
};

#[automock]
#[async_trait]
pub trait PaymentConfirmationRepository {
    async fn find_checkout_payment_by_reference(
        &self,
        reference_number: &str,
    ) -> Result<Option<CheckoutPaymentEntity>>;

    async fn find_order_by_checkout_payment_id(
        &self,
        checkout_payment_id: &str,
    ) -> Result<Option<OrderEntity>>;

    /// Marks the payment paid, the checkout completed and the order confirmed
    /// as one unit. Either all three rows change or none do.
    async fn confirm_order_payment(
        &self,
        confirm: ConfirmOrderPaymentEntity,
    ) -> Result<ConfirmPaymentOutcome>;
}
