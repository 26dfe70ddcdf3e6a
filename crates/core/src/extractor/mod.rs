//! Content extractor seam and the built-in readability extractor.
//!
//! The pipeline only talks to [`ContentExtractor`]. The bundled
//! [`ReadabilityExtractor`] scores DOM candidates the way Readability does and
//! renders the winner as block-structured plain text; any other extraction
//! backend can be plugged in through the same trait.

mod metadata;
mod readability;
mod scoring;
mod text;

pub use metadata::HtmlMetadata;
pub use readability::ReadabilityExtractor;

use url::Url;

/// Extraction quality profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Heuristic pass that favours precision and gives up early.
    Fast,
    /// Broader pass with relaxed thresholds and baseline fallbacks.
    Thorough,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Thorough => "thorough",
        }
    }
}

/// Options for a single extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub profile: Profile,
    /// Keep user comment sections.
    pub include_comments: bool,
    /// Keep `<table>` content.
    pub include_tables: bool,
    /// Prefix the body with a YAML front-matter block of page metadata.
    pub with_metadata: bool,
}

impl ExtractOptions {
    /// Options used by the pipeline: no comments, no tables, metadata header.
    pub fn for_profile(profile: Profile) -> Self {
        Self { profile, include_comments: false, include_tables: false, with_metadata: true }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::for_profile(Profile::Fast)
    }
}

/// Turns HTML into article text and page metadata.
///
/// Implementations must be pure CPU work: no I/O, no suspension. Returning
/// `None` (or blank text) from [`ContentExtractor::extract`] means the
/// profile found nothing; the caller decides whether to retry.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, html: &str, url: &Url, options: &ExtractOptions) -> Option<String>;

    /// Structured metadata for the page, or `None` if the page declares none.
    fn extract_metadata(&self, html: &str, url: &Url) -> Option<HtmlMetadata>;
}
