//! Content fetching from URLs, files, and stdin.
//!
//! The HTTP side is a single [`Fetcher`] built once at startup and shared by
//! every request. It performs exactly one GET per call and reports failures
//! in two distinct kinds: [`ExtractError::UpstreamStatus`] when the source
//! answered with an error status, and [`ExtractError::UpstreamUnavailable`]
//! when it could not be reached in time.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::article::{RawDocument, parse_source_url};
use crate::{ExtractError, Result};

/// User agent sent with every outbound request.
pub const USER_AGENT: &str = "news-extract-api/1.0";

/// HTTP client configuration for fetching web pages.
///
/// The individual timeouts bound each phase of a request; `total` is the
/// overall ceiling applied on top of them.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Time allowed to establish the TCP/TLS connection.
    pub connect_timeout: Duration,
    /// Time allowed between two successful reads of the response.
    pub read_timeout: Duration,
    /// How long an idle pooled connection is kept around.
    pub pool_idle_timeout: Duration,
    /// Overall ceiling for the whole exchange, body included.
    pub total_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(30),
            total_timeout: Duration::from_secs(15),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    /// Builds a config whose overall ceiling is `secs`, clamping the phase
    /// timeouts so none of them exceeds it.
    pub fn with_total_timeout(secs: u64) -> Self {
        let total = Duration::from_secs(secs.max(1));
        let defaults = Self::default();
        Self {
            connect_timeout: defaults.connect_timeout.min(total),
            read_timeout: defaults.read_timeout.min(total),
            total_timeout: total,
            ..defaults
        }
    }
}

/// Shared HTTP fetcher.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Builds the client once with the composite timeout from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Client`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .timeout(config.total_timeout)
            .build()
            .map_err(ExtractError::Client)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches the page at `url`.
    ///
    /// Exactly one attempt is made. Redirects are followed; the final status
    /// decides success.
    pub async fn fetch(&self, url: &Url) -> Result<RawDocument> {
        let response = self
            .client
            .get(url.clone())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "upstream returned error status");
            return Err(ExtractError::UpstreamStatus { status: status.as_u16() });
        }

        let html = response.text().await.map_err(unavailable)?;

        Ok(RawDocument::new(url.clone(), html))
    }
}

fn unavailable(err: reqwest::Error) -> ExtractError {
    let reason = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    tracing::debug!(error = %err, reason, "upstream unavailable");
    ExtractError::UpstreamUnavailable { reason: reason.to_string() }
}

/// Validates `url` and fetches it with a one-off [`Fetcher`].
///
/// Long-running processes should build a [`Fetcher`] once instead.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<RawDocument> {
    let url = parse_source_url(url)?;
    Fetcher::new(config.clone())?.fetch(&url).await
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(ExtractError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(ExtractError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(ExtractError::from)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn short_config() -> FetchConfig {
        FetchConfig {
            connect_timeout: Duration::from_millis(500),
            read_timeout: Duration::from_millis(300),
            pool_idle_timeout: Duration::from_secs(1),
            total_timeout: Duration::from_secs(2),
            ..Default::default()
        }
    }

    /// Serves one canned HTTP response per connection.
    async fn serve_raw(response: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        Url::parse(&format!("http://{}/article", addr)).unwrap()
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.total_timeout, Duration::from_secs(15));
        assert_eq!(config.user_agent, USER_AGENT);
    }

    #[test]
    fn test_with_total_timeout_clamps_phases() {
        let config = FetchConfig::with_total_timeout(3);
        assert_eq!(config.total_timeout, Duration::from_secs(3));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.read_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_fetch_url_invalid() {
        let result = fetch_url("not-a-url", &FetchConfig::default()).await;
        assert!(matches!(result, Err(ExtractError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let url = serve_raw(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 25\r\nconnection: close\r\n\r\n<html><p>Hello</p></html>",
        )
        .await;

        let fetcher = Fetcher::new(short_config()).unwrap();
        let doc = fetcher.fetch(&url).await.unwrap();
        assert!(doc.html.contains("Hello"));
        assert_eq!(doc.url, url);
    }

    #[tokio::test]
    async fn test_fetch_status_error_carries_status() {
        let url =
            serve_raw("HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;

        let fetcher = Fetcher::new(short_config()).unwrap();
        let result = fetcher.fetch(&url).await;
        assert!(matches!(result, Err(ExtractError::UpstreamStatus { status: 404 })));
    }

    #[tokio::test]
    async fn test_fetch_silent_server_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        let fetcher = Fetcher::new(short_config()).unwrap();
        let result = fetcher.fetch(&url).await;
        assert!(matches!(result, Err(ExtractError::UpstreamUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_fetch_refused_connection_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        let fetcher = Fetcher::new(short_config()).unwrap();
        let result = fetcher.fetch(&url).await;
        assert!(matches!(result, Err(ExtractError::UpstreamUnavailable { .. })));
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(ExtractError::FileNotFound(_))));
    }
}
