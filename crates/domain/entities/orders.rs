use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::orders;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = orders)]
pub struct OrderEntity {
    pub id: i64,
    pub order_number: String,
    pub checkout_id: i64,
    pub checkout_payment_id: String,
    pub status: String,
    pub customer_email: String,
    pub customer_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
    pub subtotal_minor: i64,
    pub shipping_fee_minor: i64,
    pub total_minor: i64,
    pub currency: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything the confirmation transaction touches, resolved before it begins.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmOrderPaymentEntity {
    pub checkout_payment_id: String,
    pub checkout_id: i64,
    pub order_id: i64,
    pub paid_at: DateTime<Utc>,
}
