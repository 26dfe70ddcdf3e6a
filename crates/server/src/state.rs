//! Process-wide state shared by every request.

use std::sync::Arc;

use anyhow::Context;
use news_extract_core::{FetchConfig, Fetcher, Pipeline};

use crate::auth::ApiKeys;
use crate::config::ServerConfig;
use crate::rate_limit::RateLimiter;

/// Built once at startup and handed to handlers through axum `State`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub fetcher: Arc<Fetcher>,
    pub api_keys: Arc<ApiKeys>,
    pub rate_limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, fetcher: Fetcher, api_keys: ApiKeys) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            fetcher: Arc::new(fetcher),
            api_keys: Arc::new(api_keys),
            rate_limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(Arc::new(limiter));
        self
    }

    /// Builds the state described by `config`.
    ///
    /// Fails when authentication is enabled without any key, or when the
    /// rate-limit database cannot be prepared.
    pub async fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let api_keys = if config.no_auth {
            tracing::warn!("authentication disabled");
            ApiKeys::disabled()
        } else {
            let keys = ApiKeys::new(&config.api_keys);
            anyhow::ensure!(
                !keys.is_empty(),
                "authentication is enabled but no API keys are configured (set NEWS_EXTRACT_API_KEYS or pass --no-auth)"
            );
            keys
        };

        let pipeline = Pipeline::new().context("Failed to build extraction pipeline")?;
        let fetcher =
            Fetcher::new(FetchConfig::with_total_timeout(config.fetch_timeout)).context("Failed to build HTTP client")?;

        let mut state = Self::new(pipeline, fetcher, api_keys);

        if config.rate_limit {
            let window = config.rate_limit_window();
            let limiter = match &config.database_url {
                Some(url) => RateLimiter::postgres(url, config.rate_limit_max, window)
                    .await
                    .context("Failed to prepare rate limit database")?,
                None => RateLimiter::in_memory(config.rate_limit_max, window),
            };
            tracing::info!(?limiter, "rate limiting enabled");
            state = state.with_rate_limiter(limiter);
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_auth_without_keys_is_fatal() {
        let config = ServerConfig::parse_from(["news-extract-api", "--api-keys", ""]);
        let err = AppState::from_config(&config).await.unwrap_err();
        assert!(err.to_string().contains("no API keys"));
    }

    #[tokio::test]
    async fn test_no_auth_builds_without_keys() {
        let config = ServerConfig::parse_from(["news-extract-api", "--no-auth", "--rate-limit"]);
        let config = ServerConfig { database_url: None, ..config };
        let state = AppState::from_config(&config).await.unwrap();
        assert!(!state.api_keys.is_enabled());
        assert!(state.rate_limiter.is_some());
    }
}
