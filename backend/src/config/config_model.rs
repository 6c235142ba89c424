#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub paymongo: Paymongo,
    pub order_email: OrderEmail,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// MiB.
    pub body_limit: u64,
    /// Seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_pool_size: u32,
}

#[derive(Clone)]
pub struct Paymongo {
    pub secret_key: String,
    pub webhook_secret: String,
    pub webhook_max_age_secs: i64,
}

impl std::fmt::Debug for Paymongo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paymongo")
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("webhook_max_age_secs", &self.webhook_max_age_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderEmail {
    pub cc: Vec<String>,
}
