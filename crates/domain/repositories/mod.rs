pub mod email_jobs;
pub mod email_queue;
pub mod mailer;
pub mod order_notifications;
pub mod payment_confirmation;
