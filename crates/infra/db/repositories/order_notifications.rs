use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, prelude::*};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{checkout_payments, order_lines, orders},
    },
};
use domain::{
    entities::{
        checkout_payments::CheckoutPaymentEntity, order_lines::OrderLineEntity,
        orders::OrderEntity,
    },
    repositories::order_notifications::OrderNotificationRepository,
};

pub struct OrderNotificationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OrderNotificationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OrderNotificationRepository for OrderNotificationPostgres {
    async fn find_order_by_id(&self, order_id: i64) -> Result<Option<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = orders::table
            .find(order_id)
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_order_lines(&self, order_id: i64) -> Result<Vec<OrderLineEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = order_lines::table
            .filter(order_lines::order_id.eq(order_id))
            .order(order_lines::id.asc())
            .select(OrderLineEntity::as_select())
            .load::<OrderLineEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_checkout_payment_by_id(
        &self,
        checkout_payment_id: &str,
    ) -> Result<Option<CheckoutPaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = checkout_payments::table
            .filter(checkout_payments::id.eq(checkout_payment_id))
            .select(CheckoutPaymentEntity::as_select())
            .first::<CheckoutPaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
