use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generic envelope every gateway event is decoded into before routing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymongoWebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub livemode: bool,
    #[serde(default)]
    pub data: Value,
}

impl PaymongoWebhookEvent {
    pub fn event_type(&self) -> WebhookEventType {
        WebhookEventType::from_str(&self.type_)
    }

    /// `data.attributes.reference_number`, when present and non-blank.
    pub fn reference_number(&self) -> Option<String> {
        self.data
            .get("attributes")
            .and_then(|attributes| attributes.get("reference_number"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    PaymentPaid,
    PaymentFailed,
    CheckoutSessionPaymentPaid,
    Unhandled(String),
}

impl WebhookEventType {
    pub fn from_str(value: &str) -> Self {
        match value {
            "payment.paid" => WebhookEventType::PaymentPaid,
            "payment.failed" => WebhookEventType::PaymentFailed,
            "checkout_session.payment.paid" => WebhookEventType::CheckoutSessionPaymentPaid,
            other => WebhookEventType::Unhandled(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_number_is_read_from_nested_attributes() {
        let event: PaymongoWebhookEvent = serde_json::from_value(json!({
            "id": "evt_1",
            "type": "checkout_session.payment.paid",
            "livemode": false,
            "data": { "id": "cs_1", "attributes": { "reference_number": "REF1" } }
        }))
        .unwrap();

        assert_eq!(event.event_type(), WebhookEventType::CheckoutSessionPaymentPaid);
        assert_eq!(event.reference_number().as_deref(), Some("REF1"));
    }

    #[test]
    fn blank_or_missing_reference_number_yields_none() {
        let blank: PaymongoWebhookEvent = serde_json::from_value(json!({
            "type": "checkout_session.payment.paid",
            "data": { "attributes": { "reference_number": "  " } }
        }))
        .unwrap();
        let missing: PaymongoWebhookEvent = serde_json::from_value(json!({
            "type": "checkout_session.payment.paid",
            "data": { "attributes": {} }
        }))
        .unwrap();

        assert_eq!(blank.reference_number(), None);
        assert_eq!(missing.reference_number(), None);
    }

    #[test]
    fn unknown_types_are_kept_for_logging() {
        assert_eq!(
            WebhookEventType::from_str("source.chargeable"),
            WebhookEventType::Unhandled("source.chargeable".to_string())
        );
        assert_eq!(WebhookEventType::from_str("payment.failed"), WebhookEventType::PaymentFailed);
    }
}
