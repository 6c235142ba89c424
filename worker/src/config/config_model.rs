#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub database: Database,
    pub email_queue: EmailQueue,
    pub mail: Mail,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_pool_size: u32,
}

#[derive(Debug, Clone)]
pub struct EmailQueue {
    pub poll_interval_secs: u64,
    pub max_concurrency: usize,
    pub visibility_timeout_secs: i64,
    pub max_attempts: i32,
}

#[derive(Clone)]
pub struct Mail {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

impl std::fmt::Debug for Mail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mail")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("from", &self.from)
            .finish()
    }
}
