use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use crate::infra::db::postgres::schema::email_queue;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = email_queue)]
#[diesel(primary_key(msg_id))]
pub struct QueueMessageEntity {
    pub msg_id: i64,
    pub read_ct: i32,
    pub enqueued_at: DateTime<Utc>,
    pub vt: DateTime<Utc>,
    pub message: Value,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = email_queue)]
pub struct InsertQueueMessageEntity {
    pub enqueued_at: DateTime<Utc>,
    pub vt: DateTime<Utc>,
    pub message: Value,
}
