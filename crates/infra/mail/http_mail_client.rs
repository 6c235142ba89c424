use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::domain::repositories::mailer::MailSender;

/// Sends template emails through an HTTP JSON mail API with bearer auth.
pub struct HttpMailClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

#[derive(Debug, Serialize)]
struct SendTemplateEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    cc: &'a [String],
    subject: &'a str,
    template: &'a str,
    data: Value,
}

impl HttpMailClient {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        }
    }

    async fn ensure_success(resp: reqwest::Response, template_name: &str) -> Result<()> {
        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            template_name,
            response_body = %body,
            "mail api request failed"
        );

        anyhow::bail!(
            "mail API request failed for template {} (status {})",
            template_name,
            status
        );
    }
}

#[async_trait]
impl MailSender for HttpMailClient {
    async fn send_template_email(
        &self,
        recipient: &str,
        cc: &[String],
        subject: &str,
        template_name: &str,
        data: Value,
    ) -> Result<()> {
        let request = SendTemplateEmailRequest {
            from: &self.from,
            to: vec![recipient],
            cc,
            subject,
            template: template_name,
            data,
        };

        let resp = self
            .http
            .post(&self.api_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;
        Self::ensure_success(resp, template_name).await?;

        info!(template_name, cc_count = cc.len(), "mail: template email accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_puts_recipient_in_to_list() {
        let cc = vec!["ops@example.com".to_string()];
        let request = SendTemplateEmailRequest {
            from: "shop@example.com",
            to: vec!["buyer@example.com"],
            cc: &cc,
            subject: "Order Confirmation #1001",
            template: "order-confirmation",
            data: json!({ "order_number": "1001" }),
        };

        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "from": "shop@example.com",
                "to": ["buyer@example.com"],
                "cc": ["ops@example.com"],
                "subject": "Order Confirmation #1001",
                "template": "order-confirmation",
                "data": { "order_number": "1001" }
            })
        );
    }
}
