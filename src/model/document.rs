use chrono::NaiveDate;

/// Title used when a document has none.
pub const DEFAULT_TITLE: &str = "Untitled";

/// A document to be packaged.
///
/// The body is Markdown whose `#` and `##` headings delimit chapters. When
/// the packager is configured with [`HtmlPassthrough`](crate::HtmlPassthrough)
/// the body may instead be already rendered HTML.
///
/// # Example
///
/// ```
/// use quire::Document;
///
/// let doc = Document::new("My Book", "# Intro\n\nHello.")
///     .with_author("Jane Doe")
///     .with_language("en");
/// assert_eq!(doc.display_title(), "My Book");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    /// Where the content came from, usually the article URL.
    pub source: Option<String>,
    pub date: Option<NaiveDate>,
    /// BCP 47 language tag; the packager's default applies when absent.
    pub language: Option<String>,
    /// Raw cover image bytes (JPEG, PNG, GIF, WebP or SVG).
    pub cover: Option<Vec<u8>>,
    pub body: String,
}

impl Document {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_cover(mut self, cover: Vec<u8>) -> Self {
        self.cover = Some(cover);
        self
    }

    /// The trimmed title, or [`DEFAULT_TITLE`] when blank.
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() { DEFAULT_TITLE } else { title }
    }
}

/// Trim an optional metadata field, treating blank values as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_defaults_when_blank() {
        assert_eq!(Document::new("  ", "").display_title(), DEFAULT_TITLE);
        assert_eq!(Document::new(" Dune ", "").display_title(), "Dune");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" a ")), Some("a"));
        assert_eq!(non_blank(None), None);
    }
}
