mod alerts;
mod config;
mod notifier;

use alerts::AlertLayer;
use anyhow::Result;
use config::ObservabilityConfig;
use notifier::{AlertNotifier, ChatWebhookSink};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Installs the global subscriber: `RUST_LOG` filtering (default `info`),
/// local-time fmt output and, when configured, the operator alert layer.
/// Must run inside a tokio runtime.
pub fn init_observability(component: &str) -> Result<()> {
    let config = ObservabilityConfig::from_env(component);

    let alert_layer = match config.alert.as_ref() {
        Some(alert) => {
            let sink = ChatWebhookSink::new(alert.webhook_url.clone())?;
            let notifier = AlertNotifier::spawn(vec![Arc::new(sink)]);
            Some(
                AlertLayer::new(notifier, config.service_context.clone(), alert.min_level)
                    .with_filter(LevelFilter::from_level(alert.min_level)),
            )
        }
        None => None,
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(alert_layer)
        .with(env_filter)
        .try_init()?;

    let ctx = &config.service_context;
    for warning in &config.warnings {
        warn!(
            service = %ctx.service_name,
            stage = %ctx.stage,
            component = %ctx.component,
            %warning,
            "observability: config warning"
        );
    }

    info!(
        service = %ctx.service_name,
        stage = %ctx.stage,
        component = %ctx.component,
        alerts_enabled = config.alert.is_some(),
        "observability: initialized"
    );

    Ok(())
}
