pub mod article;
pub mod error;
pub mod extractor;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod pipeline;
pub mod sanitize;

pub use article::{ArticleMeta, ExtractionResult, RawDocument, parse_source_url};
pub use error::{ExtractError, Result};
pub use extractor::{ContentExtractor, ExtractOptions, HtmlMetadata, Profile, ReadabilityExtractor};
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, Fetcher, USER_AGENT};
#[cfg(feature = "fetch")]
pub use fetch::{fetch_file, fetch_stdin, fetch_url};
pub use pipeline::{ATTEMPTS, Pipeline, ResolvedMetadata, SanitizeOptions, SanitizedBody, merge_metadata};
#[doc(hidden)]
pub use sanitize::{FrontMatter, FrontMatterStatus, NoiseFilter, NoiseRule};
pub use sanitize::{collapse_whitespace, normalize_newlines, split_front_matter};
