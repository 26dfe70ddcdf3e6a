use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use news_extract_core::{ExtractionResult, SanitizeOptions, parse_source_url};
use serde::Deserialize;
use serde::de::{self, Deserializer, Visitor};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "news-extract-api";

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractParams {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub trim_newlines: bool,
}

/// Accepts `true`/`false` plus the usual query-string spellings
/// (`1`, `yes`, `on`, `t`, `y` and their negatives), case-insensitively.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a boolean such as true, false, 1, 0, yes, no, on or off")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(de::Unexpected::Unsigned(value), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
                "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
            }
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

pub async fn root() -> Json<Value> {
    Json(json!({ "ok": true, "service": SERVICE_NAME }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Fetches the page, runs the extraction pipeline and returns the result.
#[tracing::instrument(skip_all, fields(url))]
pub async fn extract(
    State(state): State<AppState>, params: Result<Query<ExtractParams>, QueryRejection>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;

    tracing::Span::current().record("url", request.url.as_str());

    let url = parse_source_url(&request.url)?;
    let doc = state.fetcher.fetch(&url).await?;

    let pipeline = state.pipeline.clone();
    let options = SanitizeOptions { trim_newlines: params.trim_newlines };
    let result = tokio::task::spawn_blocking(move || pipeline.run(&doc, options))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "extraction task failed");
            ApiError::Internal
        })??;

    tracing::info!(chars = result.text.chars().count(), has_title = result.title.is_some(), "extracted");
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    fn trim_newlines(query: &str) -> Option<bool> {
        let uri: Uri = format!("/v1/extract{}", query).parse().unwrap();
        Query::<ExtractParams>::try_from_uri(&uri)
            .ok()
            .map(|Query(params)| params.trim_newlines)
    }

    #[test]
    fn test_trim_newlines_spellings() {
        for query in ["?trim_newlines=true", "?trim_newlines=1", "?trim_newlines=yes", "?trim_newlines=ON"] {
            assert_eq!(trim_newlines(query), Some(true), "{query}");
        }
        for query in ["", "?trim_newlines=false", "?trim_newlines=0", "?trim_newlines=no", "?trim_newlines=off"] {
            assert_eq!(trim_newlines(query), Some(false), "{query}");
        }
    }

    #[test]
    fn test_trim_newlines_rejects_unknown_values() {
        assert_eq!(trim_newlines("?trim_newlines=maybe"), None);
        assert_eq!(trim_newlines("?trim_newlines=2"), None);
    }
}
