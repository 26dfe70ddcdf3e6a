//! Leading YAML front-matter detection.
//!
//! Extractors that run with metadata enabled prefix the body with a block
//! like:
//!
//! ```text
//! ---
//! title: Example
//! date: 2024-02-02
//! ---
//! Body text...
//! ```
//!
//! [`split_front_matter`] separates that block from the body. It never
//! fails: anything that is not a well-formed, terminated mapping leaves the
//! text untouched and yields an empty [`FrontMatter`]. The outcome is
//! reported through [`FrontMatterStatus`] so callers and tests can tell the
//! degrade paths apart.

use serde_yaml::{Mapping, Value};

const DELIMITER: &str = "---";

/// Key/value pairs parsed from a front-matter block, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    entries: Mapping,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds front matter from a parsed YAML mapping.
    ///
    /// Scalar keys are stored as strings; entries keyed by sequences or maps
    /// are dropped.
    pub fn from_mapping(mapping: Mapping) -> Self {
        let entries = mapping
            .into_iter()
            .filter_map(|(key, value)| scalar_to_string(&key).map(|key| (Value::String(key), value)))
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Raw YAML value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Value under `key` rendered as text.
    ///
    /// Strings, numbers and booleans are returned as strings; blank strings,
    /// nulls, sequences and maps yield `None`.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_to_string)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// How a front-matter split concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterStatus {
    /// The text does not start with a delimiter line.
    Absent,
    /// A terminated block parsed as a mapping and was removed from the body.
    Parsed,
    /// An opening delimiter without a closing one; text left untouched.
    Unterminated,
    /// A terminated block that is not a YAML mapping; text left untouched.
    Malformed,
}

/// Result of [`split_front_matter`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatterSplit<'a> {
    /// Body text after the block, or the original text if nothing was split.
    pub body: &'a str,
    /// Parsed entries; empty unless `status` is [`FrontMatterStatus::Parsed`].
    pub front_matter: FrontMatter,
    pub status: FrontMatterStatus,
}

impl<'a> FrontMatterSplit<'a> {
    fn untouched(text: &'a str, status: FrontMatterStatus) -> Self {
        Self { body: text, front_matter: FrontMatter::new(), status }
    }

    pub fn into_parts(self) -> (&'a str, FrontMatter) {
        (self.body, self.front_matter)
    }
}

/// Splits a leading `---` delimited YAML block off `text`.
///
/// Only a delimiter on the very first line opens a block; the block ends at
/// the first following line that consists of `---` alone (trailing
/// whitespace allowed). Blank lines directly after the closing delimiter are
/// not part of the body.
///
/// # Example
///
/// ```rust
/// use news_extract_core::sanitize::{FrontMatterStatus, split_front_matter};
///
/// let split = split_front_matter("---\nkey: value\n---\nBODY");
/// assert_eq!(split.body, "BODY");
/// assert_eq!(split.front_matter.text("key"), Some("value".to_string()));
/// assert_eq!(split.status, FrontMatterStatus::Parsed);
/// ```
pub fn split_front_matter(text: &str) -> FrontMatterSplit<'_> {
    let Some(rest) = strip_opening_delimiter(text) else {
        return FrontMatterSplit::untouched(text, FrontMatterStatus::Absent);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        if content.trim_end() == DELIMITER {
            let block = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches('\n');

            return match parse_block(block) {
                Some(front_matter) => FrontMatterSplit { body, front_matter, status: FrontMatterStatus::Parsed },
                None => FrontMatterSplit::untouched(text, FrontMatterStatus::Malformed),
            };
        }
        offset += line.len();
    }

    FrontMatterSplit::untouched(text, FrontMatterStatus::Unterminated)
}

fn strip_opening_delimiter(text: &str) -> Option<&str> {
    let (first, rest) = text.split_once('\n')?;
    (first.trim_end() == DELIMITER).then_some(rest)
}

fn parse_block(block: &str) -> Option<FrontMatter> {
    if block.trim().is_empty() {
        return Some(FrontMatter::new());
    }

    match serde_yaml::from_str::<Value>(block) {
        Ok(Value::Mapping(mapping)) => Some(FrontMatter::from_mapping(mapping)),
        Ok(Value::Null) => Some(FrontMatter::new()),
        Ok(_) | Err(_) => None,
    }
}
