//! Text sanitization applied to extracted article bodies.
//!
//! Each stage is a pure function over text so it can be tested on its own:
//!
//! 1. [`normalize_newlines`] canonicalizes line endings and tabs
//! 2. [`split_front_matter`] separates a leading YAML block from the body
//! 3. [`NoiseFilter`] drops boilerplate lines (copyright, bylines, emails)
//! 4. [`collapse_whitespace`] flattens the body into a single line on request

pub mod frontmatter;
pub mod newline;
pub mod noise;
pub mod whitespace;

pub use frontmatter::{FrontMatter, FrontMatterSplit, FrontMatterStatus, split_front_matter};
pub use newline::normalize_newlines;
pub use noise::{MAX_LINE_CHARS, NoiseFilter, NoiseRule};
pub use whitespace::collapse_whitespace;
