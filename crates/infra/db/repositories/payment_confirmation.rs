use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{OptionalExtension, PgConnection, prelude::*, update};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{checkout_payments, checkouts, orders},
    },
};
use domain::{
    entities::{
        checkout_payments::CheckoutPaymentEntity,
        orders::{ConfirmOrderPaymentEntity, OrderEntity},
    },
    repositories::payment_confirmation::PaymentConfirmationRepository,
    value_objects::{
        enums::{
            checkout_payment_statuses::CheckoutPaymentStatus, checkout_statuses::CheckoutStatus,
            order_statuses::OrderStatus,
        },
        payment_confirmation::ConfirmPaymentOutcome,
    },
};

pub struct PaymentConfirmationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentConfirmationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// Anything but `Database` aborts the transaction on purpose.
#[derive(Debug, Error)]
enum ConfirmTxError {
    #[error("checkout payment {0} is already paid")]
    AlreadyPaid(String),
    #[error("{table} row {id} was not updated")]
    RowNotUpdated { table: &'static str, id: String },
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

#[async_trait]
impl PaymentConfirmationRepository for PaymentConfirmationPostgres {
    async fn find_checkout_payment_by_reference(
        &self,
        reference_number: &str,
    ) -> Result<Option<CheckoutPaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = checkout_payments::table
            .filter(checkout_payments::reference_number.eq(reference_number))
            .select(CheckoutPaymentEntity::as_select())
            .first::<CheckoutPaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_order_by_checkout_payment_id(
        &self,
        checkout_payment_id: &str,
    ) -> Result<Option<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = orders::table
            .filter(orders::checkout_payment_id.eq(checkout_payment_id))
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn confirm_order_payment(
        &self,
        confirm: ConfirmOrderPaymentEntity,
    ) -> Result<ConfirmPaymentOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<ConfirmPaymentOutcome, ConfirmTxError, _>(|conn| {
            let paid = mark_checkout_payment_paid(conn, &confirm.checkout_payment_id, confirm.paid_at)?;
            if paid == 0 {
                return Err(ConfirmTxError::AlreadyPaid(confirm.checkout_payment_id.clone()));
            }

            let completed = mark_checkout_completed(conn, confirm.checkout_id, confirm.paid_at)?;
            require_single_row(completed, "checkouts", confirm.checkout_id)?;

            let confirmed = mark_order_confirmed(conn, confirm.order_id, confirm.paid_at)?;
            require_single_row(confirmed, "orders", confirm.order_id)?;

            Ok(ConfirmPaymentOutcome::Confirmed)
        });

        match outcome {
            Ok(outcome) => Ok(outcome),
            Err(ConfirmTxError::AlreadyPaid(_)) => Ok(ConfirmPaymentOutcome::AlreadyPaid),
            Err(err) => Err(err.into()),
        }
    }
}

// Conditional so that a concurrent delivery blocked on the row lock sees zero
// rows once the winner commits.
fn mark_checkout_payment_paid(
    conn: &mut PgConnection,
    checkout_payment_id: &str,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    update(
        checkout_payments::table
            .filter(checkout_payments::id.eq(checkout_payment_id))
            .filter(checkout_payments::status.ne(CheckoutPaymentStatus::Paid.to_string())),
    )
    .set((
        checkout_payments::status.eq(CheckoutPaymentStatus::Paid.to_string()),
        checkout_payments::updated_at.eq(now),
    ))
    .execute(conn)
}

fn mark_checkout_completed(
    conn: &mut PgConnection,
    checkout_id: i64,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    update(checkouts::table.filter(checkouts::id.eq(checkout_id)))
        .set((
            checkouts::status.eq(CheckoutStatus::Completed.to_string()),
            checkouts::updated_at.eq(now),
        ))
        .execute(conn)
}

fn mark_order_confirmed(
    conn: &mut PgConnection,
    order_id: i64,
    paid_at: DateTime<Utc>,
) -> QueryResult<usize> {
    update(orders::table.filter(orders::id.eq(order_id)))
        .set((
            orders::status.eq(OrderStatus::Confirmed.to_string()),
            orders::paid_at.eq(Some(paid_at)),
            orders::updated_at.eq(paid_at),
        ))
        .execute(conn)
}

fn require_single_row(
    affected: usize,
    table: &'static str,
    id: i64,
) -> std::result::Result<(), ConfirmTxError> {
    if affected == 1 {
        Ok(())
    } else {
        Err(ConfirmTxError::RowNotUpdated {
            table,
            id: id.to_string(),
        })
    }
}
