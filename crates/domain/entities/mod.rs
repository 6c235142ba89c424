pub mod checkout_payments;
pub mod email_jobs;
pub mod email_queue;
pub mod order_lines;
pub mod orders;
