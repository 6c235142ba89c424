use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;

/// Outbound mail capability. Rendering `template_name` with `data` is the
/// mail service's job.
#[automock]
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_template_email(
        &self,
        recipient: &str,
        cc: &[String],
        subject: &str,
        template_name: &str,
        data: Value,
    ) -> Result<()>;
}
