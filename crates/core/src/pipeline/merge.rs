//! Reconciliation of HTML metadata with embedded front matter.

use crate::extractor::HtmlMetadata;
use crate::sanitize::FrontMatter;

/// Response-level metadata after merging every source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub title: Option<String>,
    pub published_at: Option<String>,
    pub site: Option<String>,
    pub lang: Option<String>,
}

/// Merges HTML metadata and front matter, first non-blank value wins:
///
/// - `title`: html `title`
/// - `published_at`: html `date`, front matter `date`, front matter `published_at`
/// - `site`: html `sitename`, front matter `site`, html `hostname`
/// - `lang`: html `language`, front matter `lang`
///
/// # Example
///
/// ```rust
/// use news_extract_core::pipeline::merge_metadata;
/// use news_extract_core::sanitize::split_front_matter;
///
/// let (_, front_matter) = split_front_matter("---\ndate: 2024-02-02\n---\nBody").into_parts();
/// let merged = merge_metadata(None, &front_matter);
/// assert_eq!(merged.published_at.as_deref(), Some("2024-02-02"));
/// ```
pub fn merge_metadata(html: Option<&HtmlMetadata>, front_matter: &FrontMatter) -> ResolvedMetadata {
    ResolvedMetadata {
        title: non_blank(html.map(|m| &m.title)),
        published_at: non_blank(html.map(|m| &m.date))
            .or_else(|| front_matter.text("date"))
            .or_else(|| front_matter.text("published_at")),
        site: non_blank(html.map(|m| &m.sitename))
            .or_else(|| front_matter.text("site"))
            .or_else(|| non_blank(html.map(|m| &m.hostname))),
        lang: non_blank(html.map(|m| &m.language)).or_else(|| front_matter.text("lang")),
    }
}

fn non_blank(value: Option<&Option<String>>) -> Option<String> {
    value?.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::split_front_matter;

    fn front_matter(text: &str) -> FrontMatter {
        split_front_matter(text).front_matter
    }

    #[test]
    fn test_html_date_beats_front_matter() {
        let html = HtmlMetadata { date: Some("2024-01-01".to_string()), ..HtmlMetadata::default() };
        let fm = front_matter("---\ndate: 2024-02-02\n---\nBODY");

        assert_eq!(merge_metadata(Some(&html), &fm).published_at.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_front_matter_date_used_without_html_metadata() {
        let fm = front_matter("---\ndate: 2024-02-02\n---\nBODY");
        assert_eq!(merge_metadata(None, &fm).published_at.as_deref(), Some("2024-02-02"));
    }

    #[test]
    fn test_published_at_key_is_last_resort() {
        let fm = front_matter("---\npublished_at: 2023-12-31\n---\nBODY");
        assert_eq!(merge_metadata(None, &fm).published_at.as_deref(), Some("2023-12-31"));

        let fm = front_matter("---\ndate: 2024-02-02\npublished_at: 2023-12-31\n---\nBODY");
        assert_eq!(merge_metadata(None, &fm).published_at.as_deref(), Some("2024-02-02"));
    }

    #[test]
    fn test_site_precedence() {
        let fm = front_matter("---\nsite: Front Matter Site\n---\nBODY");
        let hostname_only = HtmlMetadata { hostname: Some("example.com".to_string()), ..HtmlMetadata::default() };
        let with_sitename = HtmlMetadata { sitename: Some("Example Daily".to_string()), ..hostname_only.clone() };

        assert_eq!(merge_metadata(Some(&with_sitename), &fm).site.as_deref(), Some("Example Daily"));
        assert_eq!(merge_metadata(Some(&hostname_only), &fm).site.as_deref(), Some("Front Matter Site"));
        assert_eq!(
            merge_metadata(Some(&hostname_only), &FrontMatter::new()).site.as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_blank_values_fall_through() {
        let html = HtmlMetadata {
            title: Some("   ".to_string()),
            language: Some(String::new()),
            ..HtmlMetadata::default()
        };
        let fm = front_matter("---\nlang: ko\ntitle: Ignored\n---\nBODY");

        let merged = merge_metadata(Some(&html), &fm);
        assert_eq!(merged.title, None);
        assert_eq!(merged.lang.as_deref(), Some("ko"));
    }

    #[test]
    fn test_nothing_available() {
        assert_eq!(merge_metadata(None, &FrontMatter::new()), ResolvedMetadata::default());
    }
}
