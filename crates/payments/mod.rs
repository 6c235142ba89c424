pub mod paymongo_client;
pub mod webhook_signature;
