//! Boilerplate line removal.
//!
//! The filter works on whole lines: a line is either dropped or kept
//! byte-for-byte. Every rule in [`DEFAULT_RULES`] is anchored at both line
//! start and line end, so text that merely mentions a phrase like "all rights
//! reserved" in the middle of a sentence is never touched.

use regex::{Regex, RegexBuilder};

use crate::Result;

/// Lines longer than this many characters skip pattern matching entirely.
pub const MAX_LINE_CHARS: usize = 5000;

/// A single boilerplate pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseRule {
    /// Stable identifier used in logs and tests.
    pub name: &'static str,
    /// Full-line pattern; must carry its own `^`/`$` anchors.
    pub pattern: &'static str,
    pub case_insensitive: bool,
}

impl NoiseRule {
    pub const fn new(name: &'static str, pattern: &'static str, case_insensitive: bool) -> Self {
        Self { name, pattern, case_insensitive }
    }
}

/// Built-in rule table, evaluated in order.
pub const DEFAULT_RULES: &[NoiseRule] = &[
    NoiseRule::new(
        "reprint_prohibited_ko",
        r"^\s*[<\[(【]?[^\n]{0,60}?무단\s*(?:전재|복제|배포|사용)[^\n]{0,40}?(?:금지|불가)[\s.>\])】]*$",
        false,
    ),
    NoiseRule::new(
        "reprint_prohibited_ja",
        r"^\s*[<\[(【]?[^\n]{0,40}?無断(?:転載|複製|転用)[^\n]{0,20}?禁(?:止|じます)[\s。.>\])】）]*$",
        false,
    ),
    NoiseRule::new(
        "copyright_holder_ko",
        r"^\s*(?:[<\[(【]\s*저작권자|저작권자\s*(?:\(c\)|ⓒ|©))[^\n]{0,100}$",
        true,
    ),
    NoiseRule::new(
        "copyright_year",
        r"^\s*(?:copyright\s*(?:©|ⓒ|\(c\))?|©|ⓒ|\(c\))\s*(?:19|20)\d{2}(?:\s*[-–~]\s*(?:19|20)?\d{2,4})?\b[^\n]{0,200}$",
        true,
    ),
    NoiseRule::new(
        "rights_reserved",
        r"^\s*(?:(?i:copyright|©|ⓒ|\(c\))(?:\s*(?i:©|ⓒ|\(c\)))?\s*(?:(?:19|20)\d{2}\s*)?|(?:19|20)\d{2}\s+)[\p{Lu}\p{Lo}\d&][\p{L}\p{N}&'.,-]*(?:\s+[\p{Lu}\p{Lo}\d&][\p{L}\p{N}&'.,-]*){0,5}?[\s.,|-]*(?i:all\s+rights\s+reserved)[\s.]*$",
        false,
    ),
    NoiseRule::new(
        "copyright_symbol",
        r"^\s*[©ⓒ]\s*(?:(?:19|20)\d{2}\s*)?[\p{Lu}\p{Lo}\d][\p{L}\p{N}&'.-]*(?:\s+[\p{Lu}\p{Lo}\d&][\p{L}\p{N}&'.-]*){0,5}\s*$",
        false,
    ),
    NoiseRule::new(
        "reporter_email_ko",
        r"^\s*(?:\p{Hangul}{2,5}\s*[·,]?\s*){1,4}(?:기자|특파원|통신원)\s*[(\[<]?\s*[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+\s*[)\]>]?[\s.]*$",
        false,
    ),
    NoiseRule::new(
        "reporter_email_en",
        r"^\s*(?:by\s+)?[\p{L}.'-]+(?:\s+[\p{L}.'-]+){0,4}\s*[,|-]?\s*(?:staff\s+)?(?:reporter|correspondent|writer|editor)\s*[,|:-]?\s*[(\[<]?[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+[)\]>]?[\s.]*$",
        true,
    ),
    NoiseRule::new(
        "byline_email",
        r"^\s*by\s+[\p{L}.'-]+(?:\s+[\p{L}.'-]+){0,4}\s*[,|:-]?\s*[(\[<]?[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+[)\]>]?[\s.]*$",
        true,
    ),
    NoiseRule::new(
        "contact_email",
        r"^\s*(?:contact|e-?mail|mail|문의|제보|연락처|이메일)\s*[:：]?\s*[(\[<]?[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+[)\]>]?[\s.]*$",
        true,
    ),
    NoiseRule::new(
        "standalone_email",
        r"^\s*[(\[<]?[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+[)\]>]?[\s.]*$",
        true,
    ),
    NoiseRule::new(
        "markdown_mailto",
        r"^\s*[^\n\[\]]{0,40}\[[^\]\n]{1,80}\]\(mailto:[^)\s]+\)[\s.]*$",
        true,
    ),
];

/// Compiled rule table plus the blank-line collapser.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    rules: Vec<(&'static str, Regex)>,
    blank_runs: Regex,
}

impl NoiseFilter {
    /// Compiles [`DEFAULT_RULES`].
    pub fn new() -> Result<Self> {
        Self::with_rules(DEFAULT_RULES)
    }

    /// Compiles a custom rule table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ExtractError::InvalidPattern`] if any pattern fails to
    /// compile.
    pub fn with_rules(rules: &[NoiseRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                RegexBuilder::new(rule.pattern)
                    .case_insensitive(rule.case_insensitive)
                    .build()
                    .map(|regex| (rule.name, regex))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { rules, blank_runs: Regex::new(r"\n{3,}")? })
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(name, _)| *name)
    }

    /// Name of the first rule matching `line`, if any.
    ///
    /// Blank lines and lines over [`MAX_LINE_CHARS`] characters never match.
    pub fn matching_rule(&self, line: &str) -> Option<&'static str> {
        if line.trim().is_empty() || exceeds_line_limit(line) {
            return None;
        }

        self.rules.iter().find(|(_, regex)| regex.is_match(line)).map(|(name, _)| *name)
    }

    pub fn is_noise(&self, line: &str) -> bool {
        self.matching_rule(line).is_some()
    }

    /// Drops every noise line from `text`, then collapses runs of three or
    /// more newlines into a single blank line.
    ///
    /// Expects `\n` line endings; run [`super::normalize_newlines`] first.
    pub fn filter(&self, text: &str) -> String {
        let kept = text
            .split('\n')
            .filter(|line| match self.matching_rule(line) {
                Some(rule) => {
                    tracing::trace!(rule, "dropping noise line");
                    false
                }
                None => true,
            })
            .collect::<Vec<_>>()
            .join("\n");

        self.blank_runs.replace_all(&kept, "\n\n").into_owned()
    }
}

fn exceeds_line_limit(line: &str) -> bool {
    line.len() > MAX_LINE_CHARS && line.chars().count() > MAX_LINE_CHARS
}
