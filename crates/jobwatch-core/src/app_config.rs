use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub categories_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub search_api_url: String,
    pub source_request_timeout_secs: u64,
    pub source_user_agent: String,
    pub source_max_retries: u32,
    pub source_retry_backoff_base_secs: u64,
    pub inter_category_delay_secs: u64,
    pub notify_timeout_secs: u64,
    pub notify_max_retries: u32,
    pub freelancer_url: String,
    pub freelancer_cron: String,
    pub freelancer_webhook_url: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("categories_path", &self.categories_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("search_api_url", &self.search_api_url)
            .field(
                "source_request_timeout_secs",
                &self.source_request_timeout_secs,
            )
            .field("source_user_agent", &self.source_user_agent)
            .field("source_max_retries", &self.source_max_retries)
            .field(
                "source_retry_backoff_base_secs",
                &self.source_retry_backoff_base_secs,
            )
            .field("inter_category_delay_secs", &self.inter_category_delay_secs)
            .field("notify_timeout_secs", &self.notify_timeout_secs)
            .field("notify_max_retries", &self.notify_max_retries)
            .field("freelancer_url", &self.freelancer_url)
            .field("freelancer_cron", &self.freelancer_cron)
            .field(
                "freelancer_webhook_url",
                &self.freelancer_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
