use anyhow::{Context, Result, bail};
use std::str::FromStr;

use super::config_model::{Database, DotEnvyConfig, EmailQueue, Mail};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let database = Database {
        url: required("DATABASE_URL")?,
        max_pool_size: with_default("DATABASE_MAX_POOL_SIZE", 10)?,
    };

    let email_queue = EmailQueue {
        poll_interval_secs: with_default("EMAIL_QUEUE_POLL_INTERVAL_SECS", 5)?,
        max_concurrency: with_default("EMAIL_QUEUE_MAX_CONCURRENCY", 5)?,
        visibility_timeout_secs: with_default("EMAIL_QUEUE_VISIBILITY_TIMEOUT_SECS", 60)?,
        max_attempts: with_default("EMAIL_QUEUE_MAX_ATTEMPTS", 5)?,
    };
    validate_email_queue(&email_queue)?;

    let mail = Mail {
        api_url: required("MAIL_API_URL")?,
        api_key: required("MAIL_API_KEY")?,
        from: required("MAIL_FROM")?,
    };

    Ok(DotEnvyConfig {
        database,
        email_queue,
        mail,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn with_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} is invalid")),
        _ => Ok(default),
    }
}

fn validate_email_queue(email_queue: &EmailQueue) -> Result<()> {
    if email_queue.max_concurrency < 1 {
        bail!("EMAIL_QUEUE_MAX_CONCURRENCY must be at least 1");
    }
    if email_queue.poll_interval_secs < 1 {
        bail!("EMAIL_QUEUE_POLL_INTERVAL_SECS must be at least 1");
    }
    if email_queue.visibility_timeout_secs < 1 {
        bail!("EMAIL_QUEUE_VISIBILITY_TIMEOUT_SECS must be at least 1");
    }
    if email_queue.max_attempts < 1 {
        bail!("EMAIL_QUEUE_MAX_ATTEMPTS must be at least 1");
    }
    Ok(())
}
