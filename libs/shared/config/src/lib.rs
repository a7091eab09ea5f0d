use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_base_url: String,
    pub port: u16,
    pub store_timeout_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_base_url: env::var("STORE_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("STORE_BASE_URL not set, using empty value");
                    String::new()
                }),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            store_timeout_seconds: env::var("STORE_TIMEOUT_SECONDS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(30),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.store_base_url.is_empty()
    }
}
