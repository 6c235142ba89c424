pub mod http_mail_client;
