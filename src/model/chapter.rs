/// Heading level that opened a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    /// `# Title`
    Primary,
    /// `## Title`
    Secondary,
}

/// A titled unit of content cut from the document body at a heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Position in document order (0-based); also the spine position.
    pub index: usize,
    pub title: String,
    pub level: HeadingLevel,
    /// Source fragment for this chapter, heading line included.
    pub content: String,
    /// Well-formed XHTML body, set once the chapter has been normalized.
    pub normalized: Option<String>,
}

impl Chapter {
    pub fn new(
        index: usize,
        title: impl Into<String>,
        level: HeadingLevel,
        content: impl Into<String>,
    ) -> Self {
        Self {
            index,
            title: title.into(),
            level,
            content: content.into(),
            normalized: None,
        }
    }

    /// Archive filename of this chapter, relative to the content root.
    pub fn filename(&self) -> String {
        format!("chapter{}.xhtml", self.index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_is_one_based() {
        let ch = Chapter::new(0, "Intro", HeadingLevel::Primary, "# Intro");
        assert_eq!(ch.filename(), "chapter1.xhtml");
        assert!(ch.normalized.is_none());
    }
}
