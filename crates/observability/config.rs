use std::env;
use tracing::Level;
use url::Url;

#[derive(Clone, Debug)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) stage: String,
    pub(crate) component: String,
}

#[derive(Clone, Debug)]
pub(crate) struct AlertConfig {
    pub(crate) webhook_url: Url,
    pub(crate) min_level: Level,
}

#[derive(Clone, Debug)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) alert: Option<AlertConfig>,
    /// Logged once tracing is up.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(component: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let component = component.trim().to_string();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let service_context = ServiceContext {
            service_name: non_empty("SERVICE_NAME").unwrap_or_else(|| component.clone()),
            stage: non_empty("STAGE").unwrap_or_else(|| "local".to_string()),
            component,
        };

        let mut warnings = Vec::new();
        let alert = alert_from_lookup(&non_empty, &mut warnings);

        Self {
            service_context,
            alert,
            warnings,
        }
    }
}

fn alert_from_lookup<F>(lookup: &F, warnings: &mut Vec<String>) -> Option<AlertConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let enabled = match lookup("ALERT_NOTIFY_ENABLED") {
        Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
            warnings.push(format!(
                "ALERT_NOTIFY_ENABLED is not a boolean (value: {raw}); treating as enabled"
            ));
            true
        }),
        None => true,
    };
    if !enabled {
        return None;
    }

    // The URL embeds a token, so only the parse error is reported.
    let webhook_url = match Url::parse(&lookup("ALERT_WEBHOOK_URL")?) {
        Ok(url) => url,
        Err(err) => {
            warnings.push(format!(
                "ALERT_WEBHOOK_URL is invalid; operator alerts disabled (parse error: {err})"
            ));
            return None;
        }
    };

    let min_level = match lookup("ALERT_NOTIFY_LEVEL") {
        Some(raw) => parse_level(&raw).unwrap_or_else(|| {
            warnings.push(format!(
                "ALERT_NOTIFY_LEVEL is invalid (value: {raw}); defaulting to ERROR"
            ));
            Level::ERROR
        }),
        None => Level::ERROR,
    };

    Some(AlertConfig {
        webhook_url,
        min_level,
    })
}

fn parse_level(input: &str) -> Option<Level> {
    match input.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
