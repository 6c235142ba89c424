use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::email_jobs;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = email_jobs)]
#[diesel(primary_key(queue_id))]
pub struct EmailJobEntity {
    pub queue_id: i64,
    pub recipient: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub template_name: String,
    pub order_id: Option<i64>,
    pub checkout_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = email_jobs)]
pub struct InsertEmailJobEntity {
    pub queue_id: i64,
    pub recipient: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub template_name: String,
    pub order_id: Option<i64>,
    pub checkout_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
