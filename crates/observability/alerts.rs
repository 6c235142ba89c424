use super::config::ServiceContext;
use super::notifier::{AlertEvent, AlertNotifier};
use chrono::Utc;
use std::collections::BTreeMap;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

const SENSITIVE_FIELD_MARKERS: [&str; 6] = [
    "secret",
    "signature",
    "token",
    "password",
    "authorization",
    "webhook",
];

/// Forwards events at or above `min_level` to the operator alert channel.
pub(crate) struct AlertLayer {
    notifier: AlertNotifier,
    service_context: ServiceContext,
    min_level: Level,
}

impl AlertLayer {
    pub(crate) fn new(notifier: AlertNotifier, service_context: ServiceContext, min_level: Level) -> Self {
        Self {
            notifier,
            service_context,
            min_level,
        }
    }
}

#[derive(Default)]
struct RedactingVisitor {
    fields: BTreeMap<String, String>,
}

impl RedactingVisitor {
    fn insert(&mut self, field: &Field, value: String) {
        let value = if is_sensitive(field.name()) {
            "[REDACTED]".to_string()
        } else {
            value
        };
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for RedactingVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }
}

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Level ordering in tracing is by verbosity: ERROR is the smallest.
        if *metadata.level() > self.min_level {
            return;
        }

        let mut visitor = RedactingVisitor::default();
        event.record(&mut visitor);
        let message = visitor.fields.remove("message");

        let span_names = ctx
            .event_span(event)
            .map(|span| {
                span.scope()
                    .from_root()
                    .map(|s| s.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        self.notifier.notify(AlertEvent {
            level: *metadata.level(),
            timestamp: Utc::now(),
            service_name: self.service_context.service_name.clone(),
            stage: self.service_context.stage.clone(),
            component: self.service_context.component.clone(),
            target: metadata.target().to_string(),
            message,
            fields: visitor.fields,
            span_names,
        });
    }
}

pub(crate) fn is_sensitive(field_name: &str) -> bool {
    let field = field_name.to_ascii_lowercase();
    SENSITIVE_FIELD_MARKERS
        .iter()
        .any(|marker| field.contains(marker))
}
