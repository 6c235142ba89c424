pub mod checkout_payment_statuses;
pub mod checkout_statuses;
pub mod email_templates;
pub mod order_statuses;
