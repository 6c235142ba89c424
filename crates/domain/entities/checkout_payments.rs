use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use crate::infra::db::postgres::schema::checkout_payments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = checkout_payments)]
pub struct CheckoutPaymentEntity {
    pub id: String,
    pub checkout_id: i64,
    pub reference_number: String,
    pub status: String,
    pub amount_minor: i64,
    pub currency: String,
    pub payment_method_used: Option<String>,
    pub gateway_metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
