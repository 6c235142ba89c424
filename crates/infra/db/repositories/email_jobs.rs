use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::email_jobs},
};
use domain::{
    entities::email_jobs::{EmailJobEntity, InsertEmailJobEntity},
    repositories::email_jobs::EmailJobRepository,
};

pub struct EmailJobPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl EmailJobPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl EmailJobRepository for EmailJobPostgres {
    async fn insert_email_job(&self, email_job: InsertEmailJobEntity) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let queue_id = insert_into(email_jobs::table)
            .values(&email_job)
            .returning(email_jobs::queue_id)
            .get_result::<i64>(&mut conn)?;

        Ok(queue_id)
    }

    async fn find_email_job_by_id(&self, queue_id: i64) -> Result<Option<EmailJobEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = email_jobs::table
            .find(queue_id)
            .select(EmailJobEntity::as_select())
            .first::<EmailJobEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
