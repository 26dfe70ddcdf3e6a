use scraper::{ElementRef, Html, Selector};
use serde_yaml::{Mapping, Value};
use url::Url;

use super::metadata::HtmlMetadata;
use super::scoring::{Candidate, ClassPatterns, ScoreConfig, collapsed_text, link_density, score_candidates};
use super::text::render_text;
use super::{ContentExtractor, ExtractOptions, Profile};
use crate::Result;

/// Per-profile thresholds.
#[derive(Debug, Clone, Copy)]
struct ProfileSettings {
    /// Skip subtrees whose class/id looks like page chrome while scoring.
    prune_unlikely: bool,
    /// Lowest acceptable score for the winning candidate.
    min_score: f64,
    /// Pull in qualifying siblings of the winner.
    merge_siblings: bool,
    /// Fewer rendered characters than this counts as nothing found.
    min_text_chars: usize,
    /// Fall back to `<article>`, `<main>`, body paragraphs, then body text.
    baseline_fallback: bool,
}

impl From<Profile> for ProfileSettings {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Fast => Self {
                prune_unlikely: true,
                min_score: 20.0,
                merge_siblings: false,
                min_text_chars: 140,
                baseline_fallback: false,
            },
            Profile::Thorough => Self {
                prune_unlikely: false,
                min_score: f64::MIN_POSITIVE,
                merge_siblings: true,
                min_text_chars: 1,
                baseline_fallback: true,
            },
        }
    }
}

const BASELINE_CONTAINERS: [&str; 3] = ["article", "main", "[role=\"main\"]"];

/// Front-matter keys written ahead of the body, in output order.
const FRONT_MATTER_KEYS: [&str; 7] = ["title", "author", "url", "hostname", "description", "sitename", "date"];

/// Readability-style extractor built on `scraper`.
///
/// Paragraph-like elements push scores up to their parent and grandparent;
/// the best container (optionally with its qualifying siblings) is rendered
/// as plain text.
///
/// # Example
///
/// ```rust
/// use news_extract_core::extractor::{ContentExtractor, ExtractOptions, Profile, ReadabilityExtractor};
/// use url::Url;
///
/// let html = r#"<html><head><title>Example</title></head><body><article>
///     <p>A first paragraph of the story, with some commas, and enough text to be scored properly.</p>
///     <p>A second paragraph of the story, also long enough, that keeps the reader going a while.</p>
/// </article></body></html>"#;
///
/// let extractor = ReadabilityExtractor::new().unwrap();
/// let url = Url::parse("https://example.com/story").unwrap();
/// let mut options = ExtractOptions::for_profile(Profile::Thorough);
/// options.with_metadata = false;
///
/// let text = extractor.extract(html, &url, &options).unwrap();
/// assert!(text.starts_with("A first paragraph"));
/// ```
#[derive(Debug, Clone)]
pub struct ReadabilityExtractor {
    patterns: ClassPatterns,
    config: ScoreConfig,
}

impl ReadabilityExtractor {
    /// # Errors
    ///
    /// Returns [`crate::ExtractError::InvalidPattern`] if a built-in class
    /// pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self { patterns: ClassPatterns::new()?, config: ScoreConfig::default() })
    }

    /// Body text under `options`, without any metadata header.
    fn extract_body(&self, document: &Html, options: &ExtractOptions) -> Option<String> {
        let settings = ProfileSettings::from(options.profile);
        let root = body_element(document);

        let candidates = score_candidates(root, &self.patterns, &self.config, options, settings.prune_unlikely);
        let from_candidates = candidates
            .first()
            .filter(|top| top.score >= settings.min_score)
            .map(|top| {
                if settings.merge_siblings {
                    self.render_with_siblings(top, &candidates, options)
                } else {
                    render_text(top.element, &self.patterns, options)
                }
            })
            .filter(|text| text.chars().count() >= settings.min_text_chars);

        if let Some(text) = from_candidates {
            return Some(text);
        }

        if settings.baseline_fallback {
            tracing::trace!(profile = options.profile.as_str(), "no scored candidate, using baseline");
            return self.baseline(document, root, options);
        }
        None
    }

    /// The winner plus siblings that scored at least `max(10, top * 0.2)` or
    /// read like standalone prose paragraphs, in document order.
    fn render_with_siblings(&self, top: &Candidate<'_>, candidates: &[Candidate<'_>], options: &ExtractOptions) -> String {
        let Some(parent) = top.element.parent().and_then(ElementRef::wrap) else {
            return render_text(top.element, &self.patterns, options);
        };
        let threshold = (top.score * 0.2).max(10.0);

        parent
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|sibling| {
                *sibling == top.element
                    || candidates.iter().any(|c| c.element == *sibling && c.score >= threshold)
                    || is_prose_paragraph(*sibling)
            })
            .filter(|sibling| !self.patterns.is_excluded(*sibling, options))
            .map(|sibling| render_text(sibling, &self.patterns, options))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn baseline(&self, document: &Html, root: ElementRef<'_>, options: &ExtractOptions) -> Option<String> {
        for css in BASELINE_CONTAINERS {
            if let Some(container) = select_first(document, css) {
                let text = render_text(container, &self.patterns, options);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }

        let paragraphs = Selector::parse("p")
            .map(|selector| {
                root.select(&selector)
                    .filter(|p| !self.patterns.excluded_in_context(*p, root, options, false))
                    .map(|p| render_text(p, &self.patterns, options))
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        if !paragraphs.is_empty() {
            return Some(paragraphs.join("\n"));
        }

        let text = render_text(root, &self.patterns, options);
        (!text.is_empty()).then_some(text)
    }
}

impl ContentExtractor for ReadabilityExtractor {
    fn extract(&self, html: &str, url: &Url, options: &ExtractOptions) -> Option<String> {
        let document = Html::parse_document(html);
        let body = self.extract_body(&document, options)?;

        if !options.with_metadata {
            return Some(body);
        }

        let metadata = HtmlMetadata::from_document(&document, Some(url));
        match front_matter_header(&metadata) {
            Some(header) => Some(format!("{}{}", header, body)),
            None => Some(body),
        }
    }

    fn extract_metadata(&self, html: &str, url: &Url) -> Option<HtmlMetadata> {
        let metadata = HtmlMetadata::from_document(&Html::parse_document(html), Some(url));
        (!metadata.is_empty()).then_some(metadata)
    }
}

fn body_element(document: &Html) -> ElementRef<'_> {
    select_first(document, "body").unwrap_or_else(|| document.root_element())
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

/// A `<p>` that reads as prose: long with few links, or short with none and
/// sentence punctuation.
fn is_prose_paragraph(element: ElementRef<'_>) -> bool {
    if element.value().name() != "p" {
        return false;
    }

    let text = collapsed_text(element);
    let length = text.chars().count();
    let density = link_density(element);

    match length {
        0 => false,
        81.. => density < 0.25,
        _ => density == 0.0 && (text.contains(". ") || text.ends_with('.')),
    }
}

/// YAML front-matter block for the populated metadata fields, or `None`
/// when there is nothing to write.
fn front_matter_header(metadata: &HtmlMetadata) -> Option<String> {
    let values = [
        &metadata.title,
        &metadata.author,
        &metadata.url,
        &metadata.hostname,
        &metadata.description,
        &metadata.sitename,
        &metadata.date,
    ];

    let mapping = FRONT_MATTER_KEYS
        .iter()
        .zip(values)
        .filter_map(|(key, value)| value.as_ref().map(|v| (Value::from(*key), Value::from(v.as_str()))))
        .collect::<Mapping>();

    if mapping.is_empty() {
        return None;
    }

    let yaml = serde_yaml::to_string(&mapping).ok()?;
    Some(format!("---\n{}---\n", yaml))
}
