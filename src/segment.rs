//! Chapter segmentation.
//!
//! Splits a flat Markdown body into chapters at level-1 (`# Title`) and
//! level-2 (`## Title`) heading lines. Each chapter keeps its own heading
//! line as the first line of its content so the rendered chapter still
//! shows the heading.

use crate::model::{Chapter, HeadingLevel};

/// Classify a line as a chapter heading.
///
/// A heading is one or two `#` characters followed by at least one
/// whitespace character and a non-blank title. Level 1 is tested first.
pub fn classify_heading(line: &str) -> Option<(HeadingLevel, &str)> {
    heading_text(line, "#")
        .map(|title| (HeadingLevel::Primary, title))
        .or_else(|| heading_text(line, "##").map(|title| (HeadingLevel::Secondary, title)))
}

fn heading_text<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let title = rest.trim();
    (!title.is_empty()).then_some(title)
}

/// Split `body` into chapters.
///
/// Lines before the first heading are kept at the top of the first
/// chapter. Without any heading the whole trimmed body becomes a single
/// [`HeadingLevel::Primary`] chapter named `fallback_title`; this also
/// applies to a blank body, so at least one chapter is always returned.
///
/// # Example
///
/// ```
/// use quire::segment::split_chapters;
/// use quire::HeadingLevel;
///
/// let chapters = split_chapters("# Intro\ntext\n## Sub\nmore", "Book");
/// assert_eq!(chapters.len(), 2);
/// assert_eq!(chapters[1].title, "Sub");
/// assert_eq!(chapters[1].level, HeadingLevel::Secondary);
/// ```
pub fn split_chapters(body: &str, fallback_title: &str) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    let mut open: Option<(String, HeadingLevel)> = None;
    let mut lines: Vec<&str> = Vec::new();

    for line in body.lines() {
        if let Some((level, title)) = classify_heading(line) {
            if let Some((title, level)) = open.take() {
                let content = lines.join("\n").trim().to_string();
                chapters.push(Chapter::new(chapters.len(), title, level, content));
                lines.clear();
            }
            open = Some((title.to_string(), level));
        }
        lines.push(line);
    }

    match open {
        Some((title, level)) => {
            let content = lines.join("\n").trim().to_string();
            chapters.push(Chapter::new(chapters.len(), title, level, content));
        }
        None => {
            chapters.push(Chapter::new(
                0,
                fallback_title,
                HeadingLevel::Primary,
                body.trim(),
            ));
        }
    }

    log::debug!("segmented body into {} chapter(s)", chapters.len());
    chapters
}
