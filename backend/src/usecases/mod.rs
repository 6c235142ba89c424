pub mod email_notification;
pub mod payment_confirmation;
pub mod paymongo_webhook;

#[cfg(test)]
mod tests;
