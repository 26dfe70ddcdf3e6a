use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

/// HTTP service that extracts article text and metadata from news pages
#[derive(Parser, Debug, Clone)]
#[command(name = "news-extract-api")]
#[command(version)]
#[command(about = "HTTP service that extracts article text and metadata from news pages", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "NEWS_EXTRACT_BIND", default_value = "0.0.0.0:8000", value_name = "ADDR")]
    pub bind: SocketAddr,

    /// Accepted API keys, comma separated
    #[arg(long, env = "NEWS_EXTRACT_API_KEYS", value_delimiter = ',', value_name = "KEYS")]
    pub api_keys: Vec<String>,

    /// Serve /v1 routes without an API key
    #[arg(long, env = "NEWS_EXTRACT_NO_AUTH")]
    pub no_auth: bool,

    /// Enable the global rate limit
    #[arg(long, env = "NEWS_EXTRACT_RATE_LIMIT")]
    pub rate_limit: bool,

    /// Requests allowed per window
    #[arg(long, env = "NEWS_EXTRACT_RATE_LIMIT_MAX", default_value = "50", value_name = "N")]
    pub rate_limit_max: u32,

    /// Window length in seconds
    #[arg(long, env = "NEWS_EXTRACT_RATE_LIMIT_WINDOW", default_value = "60", value_name = "SECS")]
    pub rate_limit_window: u64,

    /// Postgres URL for the shared rate-limit store (in-memory when absent)
    #[arg(long, env = "DATABASE_URL", value_name = "URL")]
    pub database_url: Option<String>,

    /// CORS origins: "*" or a comma separated list
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "*", value_name = "ORIGINS")]
    pub allowed_origins: String,

    /// Overall timeout for fetching the source page, in seconds
    #[arg(long, env = "NEWS_EXTRACT_FETCH_TIMEOUT", default_value = "15", value_name = "SECS")]
    pub fetch_timeout: u64,

    /// Overall timeout for handling a request, in seconds
    #[arg(long, env = "NEWS_EXTRACT_REQUEST_TIMEOUT", default_value = "30", value_name = "SECS")]
    pub request_timeout: u64,
}

impl ServerConfig {
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            allowed_origins: self.allowed_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout.max(1)),
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window.max(1))
    }
}

/// Settings for the middleware stack wrapped around the router.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub allowed_origins: String,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { allowed_origins: "*".to_string(), request_timeout: Duration::from_secs(30) }
    }
}
