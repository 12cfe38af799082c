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
    pub env: Environment,
    pub log_level: String,
    pub dutchie_api_url: String,
    pub dutchie_api_token: String,
    pub dutchie_timeout_ms: u64,
    pub user_agent: String,
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    /// Stores per sequential batch for multi-store fetches; `0` fans out all
    /// stores at once.
    pub specials_batch_size: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("dutchie_api_url", &self.dutchie_api_url)
            .field("dutchie_api_token", &"[redacted]")
            .field("dutchie_timeout_ms", &self.dutchie_timeout_ms)
            .field("user_agent", &self.user_agent)
            .field("cache_enabled", &self.cache_enabled)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("specials_batch_size", &self.specials_batch_size)
            .finish()
    }
}
