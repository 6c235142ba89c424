pub mod config;
pub mod email_notification;
pub mod usecases;
