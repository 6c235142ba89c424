use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::{
    RunQueryDsl, define_sql_function, delete, insert_into,
    prelude::*,
    update,
};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    domain::{
        entities::email_queue::{InsertQueueMessageEntity, QueueMessageEntity},
        repositories::email_queue::QueueClient,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::email_queue},
};

define_sql_function! {
    fn nextval(sequence: diesel::sql_types::Text) -> diesel::sql_types::BigInt;
}

const MSG_ID_SEQUENCE: &str = "email_queue_msg_id_seq";

pub const DEFAULT_VISIBILITY_TIMEOUT_SECS: i64 = 60;

/// Visibility-timeout queue over the `email_queue` table. A received message
/// stays hidden until its `vt` passes; nothing but `delete` removes it.
pub struct PostgresEmailQueue {
    db_pool: Arc<PgPoolSquad>,
    visibility_timeout: Duration,
}

impl PostgresEmailQueue {
    pub fn new(db_pool: Arc<PgPoolSquad>, visibility_timeout: Duration) -> Self {
        Self {
            db_pool,
            visibility_timeout,
        }
    }
}

#[async_trait]
impl QueueClient for PostgresEmailQueue {
    async fn send(&self, message: Value) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let msg_id = insert_into(email_queue::table)
            .values(&InsertQueueMessageEntity {
                enqueued_at: now,
                vt: now,
                message,
            })
            .returning(email_queue::msg_id)
            .get_result::<i64>(&mut conn)?;

        Ok(msg_id)
    }

    async fn receive(&self, limit: i64) -> Result<Vec<QueueMessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let visibility_timeout = self.visibility_timeout;

        let mut messages = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let now = Utc::now();

            let visible_ids = email_queue::table
                .select(email_queue::msg_id)
                .filter(email_queue::vt.le(now))
                .order(email_queue::msg_id.asc())
                .limit(limit)
                .for_update()
                .skip_locked()
                .load::<i64>(conn)?;

            if visible_ids.is_empty() {
                return Ok(Vec::new());
            }

            update(email_queue::table.filter(email_queue::msg_id.eq_any(&visible_ids)))
                .set((
                    email_queue::vt.eq(now + visibility_timeout),
                    email_queue::read_ct.eq(email_queue::read_ct + 1),
                ))
                .returning(QueueMessageEntity::as_returning())
                .get_results::<QueueMessageEntity>(conn)
        })?;

        messages.sort_by_key(|message| message.msg_id);
        Ok(messages)
    }

    async fn delete(&self, msg_id: i64) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(email_queue::table.find(msg_id)).execute(&mut conn)?;

        Ok(deleted > 0)
    }

    async fn allocate_message_id(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let msg_id = diesel::select(nextval(MSG_ID_SEQUENCE)).get_result::<i64>(&mut conn)?;

        Ok(msg_id)
    }
}
