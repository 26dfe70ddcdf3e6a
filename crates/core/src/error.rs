//! Error types for extraction operations.
//!
//! This module defines [`ExtractError`], covering every failure the pipeline
//! surfaces to its callers: invalid input URLs, upstream fetch failures and
//! pages from which no content could be extracted.
//!
//! Parsing-level problems (front matter that is not valid YAML, pages without
//! metadata) are deliberately absent from this enum. They degrade to empty
//! values inside the pipeline and never reach the caller.
//!
//! # Example
//!
//! ```rust
//! use news_extract_core::{ExtractError, Result};
//!
//! fn require_body(text: &str) -> Result<&str> {
//!     if text.trim().is_empty() {
//!         return Err(ExtractError::NoContent);
//!     }
//!     Ok(text)
//! }
//! # assert!(require_body("").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fetching and extraction.
///
/// The upstream variants keep the distinction the HTTP boundary needs: a
/// source that answered with an error status is reported with that status,
/// while a source that could not be reached at all is reported as
/// [`ExtractError::UpstreamUnavailable`].
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed or uses a scheme other than
    /// `http`/`https`.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The source server answered with a non-success status.
    #[error("Upstream returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    /// The source could not be reached (timeout, connection refused, DNS).
    #[error("Timeout or connection error to source: {reason}")]
    UpstreamUnavailable { reason: String },

    /// Neither extraction profile produced any text.
    #[error("No content extracted")]
    NoContent,

    /// File not found.
    ///
    /// Returned when reading a local HTML file that doesn't exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A noise rule pattern failed to compile.
    #[error("Invalid noise pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// I/O errors while reading local input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP client could not be constructed.
    #[cfg(feature = "fetch")]
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ExtractError {
    /// Whether the error originates from the source server or the network
    /// path to it, as opposed to the page content.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamStatus { .. } | Self::UpstreamUnavailable { .. })
    }
}

/// Result type alias for ExtractError.
pub type Result<T> = std::result::Result<T, ExtractError>;
