use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Level, warn};
use url::Url;

const ALERT_CHANNEL_CAPACITY: usize = 256;
const ALERT_TEXT_LIMIT: usize = 2000;

#[derive(Clone, Debug)]
pub(crate) struct AlertEvent {
    pub(crate) level: Level,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) service_name: String,
    pub(crate) stage: String,
    pub(crate) component: String,
    pub(crate) target: String,
    pub(crate) message: Option<String>,
    pub(crate) fields: BTreeMap<String, String>,
    pub(crate) span_names: Vec<String>,
}

impl AlertEvent {
    pub(crate) fn render(&self) -> String {
        let mut lines = vec![
            format!(
                "[{}] {} ({}/{})",
                self.level, self.service_name, self.stage, self.component
            ),
            format!(
                "{} {}",
                self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                self.target
            ),
        ];

        if let Some(message) = self.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            lines.push(message.to_string());
        }
        if !self.span_names.is_empty() {
            lines.push(format!("in {}", self.span_names.join(" > ")));
        }
        for (key, value) in &self.fields {
            lines.push(format!("{key} = {value}"));
        }

        truncate(lines.join("\n"), ALERT_TEXT_LIMIT)
    }
}

#[async_trait]
pub(crate) trait AlertSink: Send + Sync {
    async fn deliver(&self, event: &AlertEvent) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Posts `{"text": ...}` to an incoming-webhook URL.
pub(crate) struct ChatWebhookSink {
    webhook_url: Url,
    client: Client,
}

impl ChatWebhookSink {
    pub(crate) fn new(webhook_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(3)).build()?;
        Ok(Self {
            webhook_url,
            client,
        })
    }
}

#[async_trait]
impl AlertSink for ChatWebhookSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<()> {
        // reqwest errors carry the URL, which carries the token.
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({ "text": event.render() }))
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    anyhow!("alert webhook request timed out")
                } else {
                    anyhow!("alert webhook request failed")
                }
            })?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "alert webhook returned status {}",
                response.status()
            ));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "chat_webhook"
    }
}

/// Hands events to a background task so the tracing layer never blocks.
#[derive(Clone)]
pub(crate) struct AlertNotifier {
    tx: mpsc::Sender<AlertEvent>,
}

impl AlertNotifier {
    pub(crate) fn spawn(sinks: Vec<Arc<dyn AlertSink>>) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertEvent>(ALERT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                for sink in &sinks {
                    if let Err(err) = sink.deliver(&event).await {
                        warn!(sink = sink.name(), error = %err, "observability: alert delivery failed");
                    }
                }
            }
        });

        Self { tx }
    }

    pub(crate) fn notify(&self, event: AlertEvent) {
        if let Err(err) = self.tx.try_send(event) {
            let reason = match err {
                mpsc::error::TrySendError::Full(_) => "full",
                mpsc::error::TrySendError::Closed(_) => "closed",
            };
            warn!(reason, "observability: alert channel unavailable; dropping event");
        }
    }
}

fn truncate(content: String, limit: usize) -> String {
    const SUFFIX: &str = "\n... (truncated)";

    if content.chars().count() <= limit {
        return content;
    }

    let keep = limit.saturating_sub(SUFFIX.len());
    let mut truncated: String = content.chars().take(keep).collect();
    truncated.push_str(SUFFIX);
    truncated
}
