pub mod email_jobs;
pub mod order_notifications;
pub mod payment_confirmation;
