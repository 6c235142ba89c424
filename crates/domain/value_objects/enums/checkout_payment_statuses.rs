use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CheckoutPaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl CheckoutPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPaymentStatus::Pending => "pending",
            CheckoutPaymentStatus::Paid => "paid",
            CheckoutPaymentStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(CheckoutPaymentStatus::Pending),
            "paid" => Some(CheckoutPaymentStatus::Paid),
            "failed" => Some(CheckoutPaymentStatus::Failed),
            _ => None,
        }
    }
}

impl Display for CheckoutPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
