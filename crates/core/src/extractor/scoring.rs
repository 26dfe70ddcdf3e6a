use std::collections::HashMap;

use regex::Regex;
use scraper::ElementRef;

use super::ExtractOptions;
use crate::Result;

/// Configuration for the content scoring pass
#[derive(Debug, Clone)]
pub(crate) struct ScoreConfig {
    /// Weight for positive class/ID patterns
    pub positive_weight: f64,
    /// Weight for negative class/ID patterns
    pub negative_weight: f64,
    /// Maximum content density score from character count
    pub max_char_density_score: f64,
    /// Maximum content density score from comma count
    pub max_comma_density_score: f64,
    /// Characters per point for content density scoring
    pub chars_per_point: usize,
    /// Paragraphs shorter than this are not scored at all
    pub min_paragraph_chars: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_char_density_score: 3.0,
            max_comma_density_score: 3.0,
            chars_per_point: 100,
            min_paragraph_chars: 25,
        }
    }
}

/// Elements whose content is never article text.
const SKIPPED_TAGS: [&str; 18] = [
    "script", "style", "noscript", "template", "iframe", "svg", "canvas", "nav", "aside", "footer", "header", "form",
    "button", "select", "input", "textarea", "object", "embed",
];

/// Tags that start a new line of text.
pub(crate) const BLOCK_TAGS: [&str; 33] = [
    "address", "article", "aside", "blockquote", "caption", "center", "dd", "details", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "ol", "p",
    "pre", "section", "summary", "table", "tr", "ul",
];

const POSITIVE_PATTERNS: &str = r"(?i)(article|body|content|entry|hentry|h-entry|main|page|post|text|blog|story)";

const NEGATIVE_PATTERNS: &str = r"(?i)(banner|breadcrumbs?|combx|comment|community|disqus|extra|foot|header|menu|related|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup|share|social|subscribe)";

const UNLIKELY_PATTERNS: &str = r"(?i)(-ad-|ai2html|banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote)";

const MAYBE_CANDIDATE_PATTERNS: &str = r"(?i)(and|article|body|column|content|main|shadow)";

const COMMENT_PATTERNS: &str = r"(?i)(^|[-_\s])(comments?|disqus|replies|respond)([-_\s]|$)";

const UNLIKELY_ROLES: [&str; 5] = ["navigation", "complementary", "banner", "contentinfo", "menu"];

/// Class/ID pattern set, compiled once per extractor.
#[derive(Debug, Clone)]
pub(crate) struct ClassPatterns {
    positive: Regex,
    negative: Regex,
    unlikely: Regex,
    maybe_candidate: Regex,
    comments: Regex,
}

impl ClassPatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            positive: Regex::new(POSITIVE_PATTERNS)?,
            negative: Regex::new(NEGATIVE_PATTERNS)?,
            unlikely: Regex::new(UNLIKELY_PATTERNS)?,
            maybe_candidate: Regex::new(MAYBE_CANDIDATE_PATTERNS)?,
            comments: Regex::new(COMMENT_PATTERNS)?,
        })
    }

    /// Returns +positive_weight if the element's ID or one of its classes
    /// matches the positive patterns, negative_weight if it matches the
    /// negative ones, zero otherwise. The ID is checked first.
    pub fn class_weight(&self, element: ElementRef<'_>, config: &ScoreConfig) -> f64 {
        let el = element.value();
        let names = el.id().into_iter().chain(el.classes());

        for name in names {
            if self.positive.is_match(name) {
                return config.positive_weight;
            }
            if self.negative.is_match(name) {
                return config.negative_weight;
            }
        }

        0.0
    }

    /// Whether the element looks like page chrome rather than content.
    pub fn is_unlikely(&self, element: ElementRef<'_>) -> bool {
        let el = element.value();
        if matches!(el.name(), "body" | "article") {
            return false;
        }
        if el.attr("role").is_some_and(|role| UNLIKELY_ROLES.contains(&role)) {
            return true;
        }

        let signature = class_and_id(element);
        self.unlikely.is_match(&signature) && !self.maybe_candidate.is_match(&signature)
    }

    pub fn is_comment_section(&self, element: ElementRef<'_>) -> bool {
        let el = element.value();
        el.id().into_iter().chain(el.classes()).any(|name| self.comments.is_match(name))
    }

    /// Whether the element and its subtree must be skipped under `options`.
    pub fn is_excluded(&self, element: ElementRef<'_>, options: &ExtractOptions) -> bool {
        let tag = element.value().name();

        SKIPPED_TAGS.contains(&tag)
            || (!options.include_tables && tag == "table")
            || is_hidden(element)
            || (!options.include_comments && self.is_comment_section(element))
    }

    /// Checks the element and every ancestor up to (not including) `root`.
    pub fn excluded_in_context(
        &self, element: ElementRef<'_>, root: ElementRef<'_>, options: &ExtractOptions, prune_unlikely: bool,
    ) -> bool {
        std::iter::once(element)
            .chain(element.ancestors().filter_map(ElementRef::wrap))
            .take_while(|el| *el != root)
            .any(|el| self.is_excluded(el, options) || (prune_unlikely && self.is_unlikely(el)))
    }
}

fn class_and_id(element: ElementRef<'_>) -> String {
    let el = element.value();
    format!("{} {}", el.attr("class").unwrap_or_default(), el.id().unwrap_or_default())
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if el.attr("hidden").is_some() || el.attr("aria-hidden") == Some("true") {
        return true;
    }

    el.attr("style").is_some_and(|style| {
        let style = style.to_ascii_lowercase().replace(' ', "");
        style.contains("display:none") || style.contains("visibility:hidden")
    })
}

/// Base score for a candidate container by tag name.
///
/// - ARTICLE: +10, SECTION: +8, DIV: +5
/// - TD, BLOCKQUOTE: +3, PRE: 0
/// - FORM, ADDRESS and list elements: -3
/// - headings, TH, HEADER, FOOTER, NAV: -5
pub(crate) fn base_tag_score(tag: &str) -> f64 {
    match tag {
        "article" => 10.0,
        "section" => 8.0,
        "div" => 5.0,
        "td" | "blockquote" => 3.0,
        "pre" => 0.0,
        "form" => -3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" => -5.0,
        _ => 0.0,
    }
}

/// Content density of a paragraph: points for length plus points for commas.
///
/// Full-width and ideographic commas count as commas.
pub(crate) fn content_density_score(text: &str, config: &ScoreConfig) -> f64 {
    let char_score = ((text.chars().count() / config.chars_per_point) as f64).min(config.max_char_density_score);
    let comma_count = text.chars().filter(|c| matches!(c, ',' | '，' | '、')).count();
    let comma_score = (comma_count as f64).min(config.max_comma_density_score);

    char_score + comma_score
}

/// Whitespace-collapsed text of an element.
pub(crate) fn collapsed_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Ratio of link text characters to total text characters, 0.0 to 1.0.
pub(crate) fn link_density(element: ElementRef<'_>) -> f64 {
    let text_length = collapsed_text(element).chars().count();
    if text_length == 0 {
        return 0.0;
    }

    let link_text_length = element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .map(|link| collapsed_text(link).chars().count())
        .sum::<usize>();

    (link_text_length as f64 / text_length as f64).min(1.0)
}

fn has_block_child(element: ElementRef<'_>) -> bool {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| BLOCK_TAGS.contains(&child.value().name()))
}

/// Elements whose own text feeds the scores of their ancestors.
fn is_scorable(element: ElementRef<'_>) -> bool {
    match element.value().name() {
        "p" | "pre" | "td" | "blockquote" => true,
        "div" => !has_block_child(element),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate<'a> {
    pub element: ElementRef<'a>,
    pub score: f64,
}

/// Scores every container under `root`, best first.
///
/// Each scorable paragraph adds `1 + density` to its parent and half that to
/// its grandparent. A container starts at its tag score plus class weight and
/// its total is finally scaled by `1 - link_density`.
pub(crate) fn score_candidates<'a>(
    root: ElementRef<'a>, patterns: &ClassPatterns, config: &ScoreConfig, options: &ExtractOptions,
    prune_unlikely: bool,
) -> Vec<Candidate<'a>> {
    let mut candidates: Vec<Candidate<'a>> = Vec::new();
    let mut index = HashMap::new();

    for element in root.descendants().filter_map(ElementRef::wrap) {
        if !is_scorable(element) || patterns.excluded_in_context(element, root, options, prune_unlikely) {
            continue;
        }

        let text = collapsed_text(element);
        if text.chars().count() < config.min_paragraph_chars {
            continue;
        }
        let score = 1.0 + content_density_score(&text, config);

        let ancestors = element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|el| !matches!(el.value().name(), "body" | "html"))
            .take(2);

        for (level, ancestor) in ancestors.enumerate() {
            let slot = *index.entry(ancestor.id()).or_insert_with(|| {
                let initial = base_tag_score(ancestor.value().name()) + patterns.class_weight(ancestor, config);
                candidates.push(Candidate { element: ancestor, score: initial });
                candidates.len() - 1
            });
            let divider = if level == 0 { 1.0 } else { 2.0 };
            candidates[slot].score += score / divider;
        }
    }

    for candidate in &mut candidates {
        candidate.score *= 1.0 - link_density(candidate.element);
    }
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}
