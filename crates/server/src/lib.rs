//! HTTP front end for the news-extract pipeline.
//!
//! [`app`] assembles the public routes (`/`, `/health`), the protected
//! `/v1/extract` route with its authentication and rate-limit layers, and the
//! shared middleware stack (request IDs, tracing, CORS, compression and a
//! request timeout).
//!
//! ```rust,no_run
//! use clap::Parser;
//! use news_extract_server::{AppState, ServerConfig, app};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ServerConfig::parse();
//! let state = AppState::from_config(&config).await?;
//! let router = app(state, &config.http_settings())?;
//!
//! let listener = tokio::net::TcpListener::bind(config.bind).await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;

use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::middleware;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use auth::{API_KEY_HEADER, ApiKeys};
pub use config::{HttpSettings, ServerConfig};
pub use error::ApiError;
pub use rate_limit::{Decision, RateLimiter};
pub use state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags each request with a random UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

/// Builds the CORS layer from `*` or a comma separated origin list.
pub fn cors_layer(allowed_origins: &str) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]).allow_headers(Any);

    if allowed_origins.trim() == "*" {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin: {origin}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(layer.allow_origin(origins))
}

/// The full application router.
pub fn app(state: AppState, settings: &HttpSettings) -> anyhow::Result<Router> {
    let protected = Router::new()
        .route("/v1/extract", post(routes::extract))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::enforce_rate_limit))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_api_key));

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!("request", method = %request.method(), uri = %request.uri(), request_id)
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(cors_layer(&settings.allowed_origins)?)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, settings.request_timeout));

    Ok(Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .merge(protected)
        .layer(middleware)
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_wildcard_and_lists() {
        assert!(cors_layer("*").is_ok());
        assert!(cors_layer("https://a.example, https://b.example").is_ok());
        assert!(cors_layer("https://bad\nexample").is_err());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let request = Request::new(());
        let mut maker = MakeRequestUuid;
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
