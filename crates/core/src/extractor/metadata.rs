use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Metadata recovered from the page markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HtmlMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Publication date as written in the page.
    pub date: Option<String>,
    pub description: Option<String>,
    pub sitename: Option<String>,
    /// Host of the source URL without a leading `www.`.
    pub hostname: Option<String>,
    pub language: Option<String>,
    /// Canonical URL when declared, else the source URL.
    pub url: Option<String>,
}

impl HtmlMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Extracts every field from a parsed document.
    pub fn from_document(html: &Html, source: Option<&Url>) -> Self {
        let reader = MetaReader::new(html);

        Self {
            title: reader.title(),
            author: reader.author(),
            date: reader.date(),
            description: reader.description(),
            sitename: reader.sitename(),
            hostname: source.and_then(hostname),
            language: reader.language(),
            url: reader.canonical_url().or_else(|| source.map(|u| u.to_string())),
        }
    }
}

fn hostname(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Collapses inner whitespace; blank values become `None`.
fn clean(value: &str) -> Option<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

fn select_first<'a>(html: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    html.select(&selector).next()
}

/// Lookup helper holding the document and its decoded JSON-LD objects.
struct MetaReader<'a> {
    html: &'a Html,
    json_ld: Vec<Value>,
}

impl<'a> MetaReader<'a> {
    fn new(html: &'a Html) -> Self {
        Self { html, json_ld: collect_json_ld(html) }
    }

    /// Title priority: JSON-LD `headline`, `og:title`, `twitter:title`,
    /// meta `title` / `DC.title`, `<title>`, first `<h1>`.
    fn title(&self) -> Option<String> {
        self.json_ld_str("headline")
            .or_else(|| self.meta("og:title"))
            .or_else(|| self.meta("twitter:title"))
            .or_else(|| self.meta("title"))
            .or_else(|| self.meta("DC.title"))
            .or_else(|| self.element_text("title"))
            .or_else(|| self.element_text("h1"))
    }

    fn author(&self) -> Option<String> {
        self.json_ld
            .iter()
            .filter_map(|obj| obj.get("author"))
            .find_map(author_name)
            .or_else(|| self.meta("author"))
            .or_else(|| self.meta("article:author"))
            .or_else(|| self.meta("DC.creator"))
    }

    /// Date priority: JSON-LD `datePublished`, `article:published_time`,
    /// meta `date` / `DC.date` / `pubdate`, first `<time datetime>`.
    fn date(&self) -> Option<String> {
        self.json_ld_str("datePublished")
            .or_else(|| self.meta("article:published_time"))
            .or_else(|| self.meta("og:published_time"))
            .or_else(|| self.meta("date"))
            .or_else(|| self.meta("DC.date"))
            .or_else(|| self.meta("pubdate"))
            .or_else(|| {
                select_first(self.html, "time[datetime]")
                    .and_then(|el| el.value().attr("datetime"))
                    .and_then(clean)
            })
    }

    fn description(&self) -> Option<String> {
        self.json_ld_str("description")
            .or_else(|| self.meta("og:description"))
            .or_else(|| self.meta("description"))
    }

    /// Site priority: JSON-LD `publisher.name`, `og:site_name`,
    /// `application-name`.
    fn sitename(&self) -> Option<String> {
        self.json_ld
            .iter()
            .filter_map(|obj| obj.get("publisher"))
            .find_map(|publisher| match publisher {
                Value::String(name) => clean(name),
                other => other.get("name").and_then(Value::as_str).and_then(clean),
            })
            .or_else(|| self.meta("og:site_name"))
            .or_else(|| self.meta("application-name"))
    }

    fn language(&self) -> Option<String> {
        select_first(self.html, "html[lang]")
            .and_then(|el| el.value().attr("lang"))
            .and_then(clean)
            .or_else(|| {
                select_first(self.html, "meta[http-equiv=\"content-language\"], meta[http-equiv=\"Content-Language\"]")
                    .and_then(|el| el.value().attr("content"))
                    .and_then(clean)
            })
            .or_else(|| self.meta("og:locale"))
    }

    fn canonical_url(&self) -> Option<String> {
        select_first(self.html, "link[rel=\"canonical\"]")
            .and_then(|el| el.value().attr("href"))
            .and_then(clean)
            .or_else(|| self.meta("og:url"))
    }

    /// Meta tag content by `name` or `property`.
    fn meta(&self, key: &str) -> Option<String> {
        ["name", "property"].iter().find_map(|attr| {
            select_first(self.html, &format!("meta[{}=\"{}\"]", attr, key))
                .and_then(|el| el.value().attr("content"))
                .and_then(clean)
        })
    }

    fn element_text(&self, css: &str) -> Option<String> {
        select_first(self.html, css).and_then(|el| clean(&el.text().collect::<String>()))
    }

    fn json_ld_str(&self, key: &str) -> Option<String> {
        self.json_ld
            .iter()
            .find_map(|obj| obj.get(key).and_then(Value::as_str).and_then(clean))
    }
}

/// Decodes every JSON-LD script, flattening top-level arrays and `@graph`.
fn collect_json_ld(html: &Html) -> Vec<Value> {
    let Ok(selector) = Selector::parse("script[type=\"application/ld+json\"]") else {
        return Vec::new();
    };

    let mut objects = Vec::new();
    for script in html.select(&selector) {
        let raw = script.text().collect::<String>();
        if let Ok(value) = serde_json::from_str::<Value>(raw.trim()) {
            flatten_json_ld(value, &mut objects);
        }
    }
    objects
}

fn flatten_json_ld(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => items.into_iter().for_each(|item| flatten_json_ld(item, out)),
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_json_ld(graph, out);
            }
            out.push(Value::Object(map));
        }
        _ => {}
    }
}

/// Author name from a JSON-LD `author` value (string, object or array).
fn author_name(author: &Value) -> Option<String> {
    match author {
        Value::String(name) => clean(name),
        Value::Object(obj) => obj.get("name").and_then(Value::as_str).and_then(clean),
        Value::Array(items) => items.iter().find_map(author_name),
        _ => None,
    }
}
