//! Block-structured plain text rendering.
//!
//! Every block element starts a new line, list items are prefixed with
//! `- `, `<br>` breaks the line and `<pre>` content is kept verbatim.
//! Inline whitespace is collapsed the way a browser would.

use scraper::ElementRef;

use super::ExtractOptions;
use super::scoring::{BLOCK_TAGS, ClassPatterns};

/// Renders `root` and its non-excluded descendants as text lines.
pub(crate) fn render_text(root: ElementRef<'_>, patterns: &ClassPatterns, options: &ExtractOptions) -> String {
    let mut renderer = Renderer { patterns, options, buffer: TextBuffer::default() };
    renderer.walk(root);
    renderer.buffer.finish()
}

struct Renderer<'r> {
    patterns: &'r ClassPatterns,
    options: &'r ExtractOptions,
    buffer: TextBuffer,
}

impl Renderer<'_> {
    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(child) = ElementRef::wrap(child) {
                self.visit(child);
            } else if let Some(text) = child.value().as_text() {
                self.buffer.push_text(text);
            }
        }
    }

    fn visit(&mut self, element: ElementRef<'_>) {
        if self.patterns.is_excluded(element, self.options) {
            return;
        }

        match element.value().name() {
            "br" => self.buffer.break_line(),
            "pre" => self.buffer.push_preformatted(&element.text().collect::<String>()),
            "li" => {
                if element.text().any(|t| !t.trim().is_empty()) {
                    self.buffer.start_item();
                    self.walk(element);
                    self.buffer.end_item();
                }
            }
            "td" | "th" => {
                self.buffer.pending_space = true;
                self.walk(element);
                self.buffer.pending_space = true;
            }
            tag if BLOCK_TAGS.contains(&tag) => {
                self.buffer.break_line();
                self.walk(element);
                self.buffer.break_line();
            }
            _ => self.walk(element),
        }
    }
}

#[derive(Debug, Default)]
struct TextBuffer {
    lines: Vec<String>,
    current: String,
    line_has_text: bool,
    pending_space: bool,
}

impl TextBuffer {
    fn push_text(&mut self, raw: &str) {
        let mut words = raw.split_whitespace().peekable();
        if words.peek().is_none() {
            if !raw.is_empty() && self.line_has_text {
                self.pending_space = true;
            }
            return;
        }

        if self.line_has_text && (self.pending_space || raw.starts_with(char::is_whitespace)) {
            self.current.push(' ');
        }
        for (i, word) in words.enumerate() {
            if i > 0 {
                self.current.push(' ');
            }
            self.current.push_str(word);
        }

        self.line_has_text = true;
        self.pending_space = raw.ends_with(char::is_whitespace);
    }

    /// Ends the current line. A pending list marker survives an empty line.
    fn break_line(&mut self) {
        if self.line_has_text {
            self.lines.push(self.current.trim_end().to_string());
            self.current.clear();
            self.line_has_text = false;
        }
        self.pending_space = false;
    }

    fn start_item(&mut self) {
        self.break_line();
        self.current.clear();
        self.current.push_str("- ");
    }

    fn end_item(&mut self) {
        self.break_line();
        self.current.clear();
    }

    fn push_preformatted(&mut self, raw: &str) {
        self.break_line();
        self.current.clear();
        for line in raw.trim_matches('\n').lines() {
            self.lines.push(line.trim_end().to_string());
        }
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n").trim_matches('\n').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn render(html: &str, options: &ExtractOptions) -> String {
        let doc = Html::parse_document(html);
        let body = doc.select(&Selector::parse("body").unwrap()).next().unwrap();
        render_text(body, &ClassPatterns::new().unwrap(), options)
    }

    #[test]
    fn test_blocks_become_lines() {
        let text = render(
            "<html><body><h1>Title</h1><p>First   paragraph\n with <b>bold</b> text.</p><div>Second</div></body></html>",
            &ExtractOptions::default(),
        );
        assert_eq!(text, "Title\nFirst paragraph with bold text.\nSecond");
    }

    #[test]
    fn test_inline_elements_keep_adjacency() {
        let text = render("<html><body><p>foo<b>bar</b> baz</p></body></html>", &ExtractOptions::default());
        assert_eq!(text, "foobar baz");
    }

    #[test]
    fn test_list_items_are_prefixed() {
        let text = render(
            "<html><body><ul><li>One</li><li><p>Two</p></li><li>  </li></ul><p>After</p></body></html>",
            &ExtractOptions::default(),
        );
        assert_eq!(text, "- One\n- Two\nAfter");
    }

    #[test]
    fn test_br_and_pre() {
        let text = render(
            "<html><body><p>Line one<br>Line two</p><pre>\nfn main() {\n    run();\n}\n</pre></body></html>",
            &ExtractOptions::default(),
        );
        assert_eq!(text, "Line one\nLine two\nfn main() {\n    run();\n}");
    }

    #[test]
    fn test_excluded_subtrees_are_skipped() {
        let html = r#"<html><body>
            <nav>Menu</nav>
            <p>Kept</p>
            <script>var x = 1;</script>
            <div class="comments">Nice post</div>
            <table><tr><td>A</td><td>B</td></tr></table>
            <footer>Footer</footer>
        </body></html>"#;

        assert_eq!(render(html, &ExtractOptions::default()), "Kept");

        let lenient = ExtractOptions { include_tables: true, include_comments: true, ..ExtractOptions::default() };
        assert_eq!(render(html, &lenient), "Kept\nNice post\nA B");
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(render("<html><body>   </body></html>", &ExtractOptions::default()), "");
    }
}
