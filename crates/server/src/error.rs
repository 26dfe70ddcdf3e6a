//! HTTP error responses.
//!
//! Every failure leaves the service as `{"detail": "<short message>"}` with
//! the status chosen here. Upstream bodies and internal error chains are
//! logged, never returned.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use news_extract_core::ExtractError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request body or query string.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("invalid url")]
    InvalidUrl,

    /// The source answered with an error status, passed through as-is.
    #[error("upstream error")]
    UpstreamStatus(StatusCode),

    #[error("timeout or connection error to source")]
    UpstreamUnavailable,

    #[error("no content extracted")]
    NoContent,

    #[error("invalid or missing api key")]
    Unauthorized,

    #[error("rate limit exceeded")]
    RateLimited { retry_after: u64 },

    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidUrl | Self::NoContent => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UpstreamStatus(status) => *status,
            Self::UpstreamUnavailable => StatusCode::GATEWAY_TIMEOUT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Status reported for an upstream failure. Anything that is not a 4xx or
/// 5xx status cannot be replayed to the client and becomes 502.
fn passthrough_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(|status| status.is_client_error() || status.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::InvalidUrl(_) => Self::InvalidUrl,
            ExtractError::UpstreamStatus { status } => Self::UpstreamStatus(passthrough_status(status)),
            ExtractError::UpstreamUnavailable { .. } => Self::UpstreamUnavailable,
            ExtractError::NoContent => Self::NoContent,
            other => {
                tracing::error!(error = %other, "extraction failed");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(json!({ "detail": self.to_string() }))).into_response();

        if let Self::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_passthrough() {
        let err = ApiError::from(ExtractError::UpstreamStatus { status: 404 });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "upstream error");

        let err = ApiError::from(ExtractError::UpstreamStatus { status: 503 });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_non_error_upstream_status_becomes_bad_gateway() {
        assert_eq!(passthrough_status(304), StatusCode::BAD_GATEWAY);
        assert_eq!(passthrough_status(1000), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_error_mapping() {
        let unavailable = ExtractError::UpstreamUnavailable { reason: "request timed out".into() };
        assert_eq!(ApiError::from(unavailable).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ApiError::from(ExtractError::NoContent).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            ApiError::from(ExtractError::InvalidUrl("x".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited { retry_after: 12 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
    }
}
