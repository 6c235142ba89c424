use anyhow::{Context, Result};

use super::config_model::{BackendServer, Database, DotEnvyConfig, OrderEmail, Paymongo};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_pool_size: std::env::var("DATABASE_MAX_POOL_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_POOL_SIZE is invalid")?,
    };

    let paymongo = Paymongo {
        secret_key: required("PAYMONGO_SECRET_KEY")?,
        webhook_secret: required("PAYMONGO_WEBHOOK_SECRET")?,
        webhook_max_age_secs: std::env::var("PAYMONGO_WEBHOOK_MAX_AGE_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .context("PAYMONGO_WEBHOOK_MAX_AGE_SECS is invalid")?,
    };

    let order_email = OrderEmail {
        cc: parse_cc_list(&std::env::var("ORDER_EMAIL_CC").unwrap_or_default()),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        paymongo,
        order_email,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

/// Comma-separated addresses; blanks are dropped.
pub fn parse_cc_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}
