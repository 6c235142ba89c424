use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use serde_json::{Value, json};

use crate::domain::entities::email_queue::QueueMessageEntity;

#[automock]
#[async_trait]
pub trait QueueClient: Send + Sync {
    async fn send(&self, message: Value) -> Result<i64>;

    /// Hides up to `limit` visible messages for the visibility timeout and returns them.
    async fn receive(&self, limit: i64) -> Result<Vec<QueueMessageEntity>>;

    async fn delete(&self, msg_id: i64) -> Result<bool>;

    /// Mints a message ID by sending a placeholder and deleting it right away.
    /// The ID is only used to key the job record; the placeholder is never consumed.
    /// Queues that can hand out IDs directly override this.
    async fn allocate_message_id(&self) -> Result<i64> {
        let msg_id = self.send(json!({ "placeholder": true })).await?;
        self.delete(msg_id).await?;
        Ok(msg_id)
    }
}
