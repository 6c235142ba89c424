use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Templates the mail service knows how to render.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EmailTemplate {
    OrderConfirmation,
    PaymentConfirmation,
}

impl EmailTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailTemplate::OrderConfirmation => "order-confirmation",
            EmailTemplate::PaymentConfirmation => "payment-confirmation",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "order-confirmation" => Some(EmailTemplate::OrderConfirmation),
            "payment-confirmation" => Some(EmailTemplate::PaymentConfirmation),
            _ => None,
        }
    }
}

impl Display for EmailTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_names_round_trip_through_their_wire_names() {
        for template in [EmailTemplate::OrderConfirmation, EmailTemplate::PaymentConfirmation] {
            assert_eq!(EmailTemplate::from_str(template.as_str()), Some(template));
        }
    }

    #[test]
    fn unknown_template_name_is_rejected() {
        assert_eq!(EmailTemplate::from_str("invoice-reminder"), None);
        assert_eq!(EmailTemplate::from_str("Order-Confirmation"), None);
    }
}
