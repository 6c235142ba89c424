use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::email_jobs::{EmailJobEntity, InsertEmailJobEntity};

#[automock]
#[async_trait]
pub trait EmailJobRepository {
    async fn insert_email_job(&self, email_job: InsertEmailJobEntity) -> Result<i64>;

    async fn find_email_job_by_id(&self, queue_id: i64) -> Result<Option<EmailJobEntity>>;
}
