pub mod email_queue;
pub mod enums;
pub mod payment_confirmation;
pub mod paymongo_webhook;
