//! Chapter rendering.
//!
//! Turning Markdown into HTML is delegated to an established renderer; this
//! module only defines the seam the packager calls through and two stock
//! implementations.

use pulldown_cmark::{Event, Options, Parser, html};

/// Converts one chapter's source into an HTML fragment.
///
/// Implementations must be pure: the same input yields the same output.
pub trait ChapterRenderer: Send + Sync {
    fn render(&self, source: &str) -> String;
}

/// CommonMark renderer with tables, footnotes and strikethrough.
#[derive(Debug, Clone)]
pub struct CommonMarkRenderer {
    /// Pass raw HTML blocks through. When false they are rendered as text.
    pub allow_raw_html: bool,
}

impl Default for CommonMarkRenderer {
    fn default() -> Self {
        Self {
            allow_raw_html: true,
        }
    }
}

impl CommonMarkRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw_html(mut self, allow: bool) -> Self {
        self.allow_raw_html = allow;
        self
    }
}

impl ChapterRenderer for CommonMarkRenderer {
    fn render(&self, source: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        let allow_raw_html = self.allow_raw_html;
        let events = Parser::new_ext(source, options).map(move |event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) if !allow_raw_html => Event::Text(raw),
            other => other,
        });

        let mut out = String::with_capacity(source.len() + source.len() / 2);
        html::push_html(&mut out, events);
        out
    }
}

/// Renderer for bodies that are already HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPassthrough;

impl ChapterRenderer for HtmlPassthrough {
    fn render(&self, source: &str) -> String {
        source.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commonmark_headings_and_images() {
        let html = CommonMarkRenderer::new().render("# Intro\n\n![alt](https://x.test/a.png)");
        assert!(html.contains("<h1>Intro</h1>"));
        assert!(html.contains(r#"<img src="https://x.test/a.png" alt="alt" />"#));
    }

    #[test]
    fn test_raw_html_can_be_disabled() {
        let source = "<div>raw</div>\n";
        let kept = CommonMarkRenderer::new().render(source);
        assert!(kept.contains("<div>raw</div>"));

        let escaped = CommonMarkRenderer::new().with_raw_html(false).render(source);
        assert!(escaped.contains("&lt;div&gt;raw&lt;/div&gt;"));
    }

    #[test]
    fn test_tables_enabled() {
        let html = CommonMarkRenderer::new().render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(HtmlPassthrough.render("<p>x</p>"), "<p>x</p>");
    }
}
