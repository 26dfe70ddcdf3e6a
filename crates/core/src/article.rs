//! Request-scoped data types flowing through the pipeline.
//!
//! [`RawDocument`] is what the fetcher hands to the pipeline, and
//! [`ExtractionResult`] is what the pipeline hands back to the HTTP layer or
//! the CLI. Neither is cached or shared across requests.

use serde::Serialize;
use url::Url;

use crate::{ExtractError, Result};

/// Fetched HTML together with the URL it was requested from.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Source URL as requested by the caller.
    pub url: Url,
    /// Decoded HTML payload.
    pub html: String,
}

impl RawDocument {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self { url, html: html.into() }
    }
}

/// The final payload returned for a successful extraction.
///
/// `text` is never empty: a page whose content does not survive extraction
/// and sanitization is reported as [`ExtractError::NoContent`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Page title, if any source provided one.
    pub title: Option<String>,

    /// Cleaned article body.
    pub text: String,

    /// Provenance and publication details.
    pub meta: ArticleMeta,
}

/// Metadata block of an [`ExtractionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleMeta {
    /// The URL the caller asked for.
    pub source: String,
    /// Publication date as found in the page, unparsed.
    pub published_at: Option<String>,
    /// Site or publisher name.
    pub site: Option<String>,
    /// Page language (BCP 47 tag or locale as declared by the page).
    pub lang: Option<String>,
}

/// Parses and validates an absolute `http`/`https` URL.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidUrl`] for relative URLs, unparsable input,
/// and any scheme other than `http` or `https`.
pub fn parse_source_url(input: &str) -> Result<Url> {
    let url = Url::parse(input.trim()).map_err(|e| ExtractError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        "http" | "https" => Err(ExtractError::InvalidUrl("URL must include a host".to_string())),
        other => Err(ExtractError::InvalidUrl(format!(
            "unsupported scheme '{}', expected http or https",
            other
        ))),
    }
}
