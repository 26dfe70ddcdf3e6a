//! Extraction orchestration.
//!
//! [`Pipeline`] runs the extractor with an explicit attempt table (fast, then
//! thorough), sanitizes the winning body and merges metadata into an
//! [`ExtractionResult`]. It is built once and shared across requests; every
//! call is synchronous CPU work.

mod merge;

pub use merge::{ResolvedMetadata, merge_metadata};

use std::sync::Arc;

use crate::article::{ArticleMeta, ExtractionResult, RawDocument};
use crate::extractor::{ContentExtractor, ExtractOptions, Profile, ReadabilityExtractor};
use crate::sanitize::{
    FrontMatter, FrontMatterStatus, NoiseFilter, collapse_whitespace, normalize_newlines, split_front_matter,
};
use crate::{ExtractError, Result};

/// Profiles tried in order; the first non-blank body wins.
pub const ATTEMPTS: [Profile; 2] = [Profile::Fast, Profile::Thorough];

/// Caller-controlled sanitization switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Flatten the body into a single line of single-spaced words.
    pub trim_newlines: bool,
}

/// Sanitized body plus the front matter split off it.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedBody {
    pub text: String,
    pub front_matter: FrontMatter,
    pub front_matter_status: FrontMatterStatus,
}

/// Extraction and sanitization pipeline.
#[derive(Clone)]
pub struct Pipeline {
    extractor: Arc<dyn ContentExtractor>,
    noise: NoiseFilter,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("noise", &self.noise).finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Pipeline with the built-in readability extractor and noise rules.
    pub fn new() -> Result<Self> {
        Self::with_extractor(Arc::new(ReadabilityExtractor::new()?))
    }

    /// Pipeline with a custom extractor and the built-in noise rules.
    pub fn with_extractor(extractor: Arc<dyn ContentExtractor>) -> Result<Self> {
        Ok(Self::with_parts(extractor, NoiseFilter::new()?))
    }

    pub fn with_parts(extractor: Arc<dyn ContentExtractor>, noise: NoiseFilter) -> Self {
        Self { extractor, noise }
    }

    pub fn noise_filter(&self) -> &NoiseFilter {
        &self.noise
    }

    /// Runs the attempt table over `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::NoContent`] when every profile comes back blank.
    pub fn extract_body(&self, doc: &RawDocument) -> Result<String> {
        for (attempt, profile) in ATTEMPTS.iter().enumerate() {
            if attempt > 0 {
                tracing::debug!(url = %doc.url, profile = profile.as_str(), "retrying extraction");
            }

            let options = ExtractOptions::for_profile(*profile);
            if let Some(body) = self.extractor.extract(&doc.html, &doc.url, &options)
                && !body.trim().is_empty()
            {
                return Ok(body);
            }
        }

        tracing::info!(url = %doc.url, "no content extracted");
        Err(ExtractError::NoContent)
    }

    /// Normalizes newlines, splits front matter, drops noise lines and
    /// optionally collapses whitespace.
    pub fn sanitize(&self, body: &str, options: SanitizeOptions) -> SanitizedBody {
        let normalized = normalize_newlines(body);
        let split = split_front_matter(&normalized);
        if matches!(split.status, FrontMatterStatus::Unterminated | FrontMatterStatus::Malformed) {
            tracing::debug!(status = ?split.status, "front matter left in body");
        }

        let filtered = self.noise.filter(split.body);
        let text = if options.trim_newlines { collapse_whitespace(&filtered) } else { filtered };

        SanitizedBody { text, front_matter: split.front_matter, front_matter_status: split.status }
    }

    /// Full extraction for a fetched document.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::NoContent`] if no profile produced text or if
    /// nothing survived sanitization.
    pub fn run(&self, doc: &RawDocument, options: SanitizeOptions) -> Result<ExtractionResult> {
        let body = self.extract_body(doc)?;
        let metadata = self.extractor.extract_metadata(&doc.html, &doc.url);

        let sanitized = self.sanitize(&body, options);
        if sanitized.text.trim().is_empty() {
            tracing::info!(url = %doc.url, "body empty after sanitization");
            return Err(ExtractError::NoContent);
        }

        let resolved = merge_metadata(metadata.as_ref(), &sanitized.front_matter);
        Ok(ExtractionResult {
            title: resolved.title,
            text: sanitized.text,
            meta: ArticleMeta {
                source: doc.url.to_string(),
                published_at: resolved.published_at,
                site: resolved.site,
                lang: resolved.lang,
            },
        })
    }
}
