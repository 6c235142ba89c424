use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use crates::domain::{
    repositories::{email_jobs::EmailJobRepository, email_queue::QueueClient},
    value_objects::email_queue::{EmailJobPayload, NewEmailJobModel},
};
use tracing::info;

/// Anything that can durably schedule an email job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailJobEnqueuer: Send + Sync {
    /// Returns the email job ID.
    async fn enqueue(&self, job: NewEmailJobModel) -> Result<i64>;
}

/// Producer half of the email queue. The job row is written before the
/// queue message that points at it, so a consumer never sees a dangling ID.
pub struct EmailNotificationQueue<J, Q>
where
    J: EmailJobRepository + Send + Sync + 'static,
    Q: QueueClient + 'static,
{
    email_job_repo: Arc<J>,
    queue: Arc<Q>,
}

impl<J, Q> EmailNotificationQueue<J, Q>
where
    J: EmailJobRepository + Send + Sync + 'static,
    Q: QueueClient + 'static,
{
    pub fn new(email_job_repo: Arc<J>, queue: Arc<Q>) -> Self {
        Self {
            email_job_repo,
            queue,
        }
    }
}

#[async_trait]
impl<J, Q> EmailJobEnqueuer for EmailNotificationQueue<J, Q>
where
    J: EmailJobRepository + Send + Sync + 'static,
    Q: QueueClient + 'static,
{
    async fn enqueue(&self, job: NewEmailJobModel) -> Result<i64> {
        let email_job_id = self
            .queue
            .allocate_message_id()
            .await
            .context("allocate email queue message id")?;

        self.email_job_repo
            .insert_email_job(job.to_entity(email_job_id))
            .await
            .with_context(|| format!("insert email job {email_job_id}"))?;

        let payload = serde_json::to_value(EmailJobPayload { email_job_id })?;
        let msg_id = self
            .queue
            .send(payload)
            .await
            .with_context(|| format!("send queue message for email job {email_job_id}"))?;

        info!(
            email_job_id,
            msg_id,
            template = %job.template,
            "email_notification: job enqueued"
        );
        Ok(email_job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::{
        email_jobs::MockEmailJobRepository, email_queue::MockQueueClient,
    };
    use mockall::{Sequence, predicate::eq};
    use serde_json::json;

    fn order_job() -> NewEmailJobModel {
        NewEmailJobModel::order_confirmation(42, "1001", "buyer@example.com".to_string(), vec![])
    }

    #[tokio::test]
    async fn writes_job_row_before_sending_pointer_message() {
        let mut seq = Sequence::new();
        let mut queue = MockQueueClient::new();
        let mut jobs = MockEmailJobRepository::new();

        queue
            .expect_allocate_message_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(17));
        jobs.expect_insert_email_job()
            .withf(|job| {
                job.queue_id == 17
                    && job.template_name == "order-confirmation"
                    && job.order_id == Some(42)
                    && job.subject == "Order Confirmation #1001"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|job| Ok(job.queue_id));
        queue
            .expect_send()
            .with(eq(json!({ "email_job_id": 17 })))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(18));

        let producer = EmailNotificationQueue::new(Arc::new(jobs), Arc::new(queue));

        assert_eq!(producer.enqueue(order_job()).await.unwrap(), 17);
    }

    #[tokio::test]
    async fn failed_job_insert_sends_nothing() {
        let mut queue = MockQueueClient::new();
        let mut jobs = MockEmailJobRepository::new();

        queue.expect_allocate_message_id().returning(|| Ok(5));
        jobs.expect_insert_email_job()
            .returning(|_| Err(anyhow::anyhow!("connection reset")));
        queue.expect_send().never();

        let producer = EmailNotificationQueue::new(Arc::new(jobs), Arc::new(queue));

        let err = producer.enqueue(order_job()).await.unwrap_err();
        assert!(err.to_string().contains("insert email job 5"));
    }
}
