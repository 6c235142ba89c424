pub mod paymongo_webhook;
