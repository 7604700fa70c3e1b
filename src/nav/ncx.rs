//! EPUB 2 NCX table of contents (`toc.ncx`).

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{NavEntry, NavNode, NavTree};
use crate::error::Result;
use crate::xml::{XML_DECLARATION, XmlDoc, local_name, resolve_entity};

const NCX_NS: &str = "http://www.daisy.org/z3986/2005/ncx/";

/// Render the NCX for `tree`.
///
/// `dtb:depth` is the depth of the tree; `docAuthor` is written only when
/// an author is given.
pub fn render(tree: &NavTree, uid: &str, title: &str, author: Option<&str>) -> Result<String> {
    let mut doc = XmlDoc::new(&[XML_DECLARATION]);
    let depth = tree.depth().to_string();

    doc.open("ncx", &[("xmlns", NCX_NS), ("version", "2005-1")])?;

    doc.open("head", &[])?;
    doc.empty("meta", &[("name", "dtb:uid"), ("content", uid)])?;
    doc.empty("meta", &[("name", "dtb:depth"), ("content", &depth)])?;
    doc.empty("meta", &[("name", "dtb:totalPageCount"), ("content", "0")])?;
    doc.empty("meta", &[("name", "dtb:maxPageNumber"), ("content", "0")])?;
    doc.close("head")?;

    doc.open("docTitle", &[])?;
    doc.text_element("text", &[], title)?;
    doc.close("docTitle")?;

    if let Some(author) = author {
        doc.open("docAuthor", &[])?;
        doc.text_element("text", &[], author)?;
        doc.close("docAuthor")?;
    }

    doc.open("navMap", &[])?;
    for node in tree.roots() {
        write_nav_point(&mut doc, node)?;
    }
    doc.close("navMap")?;

    doc.close("ncx")?;
    doc.finish()
}

fn write_nav_point(doc: &mut XmlDoc, node: &NavNode) -> Result<()> {
    let id = format!("navPoint-{}", node.play_order);
    let order = node.play_order.to_string();

    doc.open("navPoint", &[("id", &id), ("playOrder", &order)])?;
    doc.open("navLabel", &[])?;
    doc.text_element("text", &[], &node.title)?;
    doc.close("navLabel")?;
    doc.empty("content", &[("src", &node.href)])?;

    for child in &node.children {
        write_nav_point(doc, child)?;
    }

    doc.close("navPoint")
}

/// Read the `navMap` outline back out of a rendered NCX.
///
/// Depth is the `navPoint` nesting level, starting at 0.
pub fn outline(xml: &str) -> Result<Vec<NavEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut open_points = 0usize;
    let mut label: Option<String> = None;
    let mut in_label = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"navPoint" => {
                    open_points += 1;
                    label = None;
                }
                b"text" if open_points > 0 => {
                    in_label = true;
                    label = Some(String::new());
                }
                _ => {}
            },
            Event::Empty(e) => {
                if local_name(e.name().as_ref()) == b"content" && open_points > 0 {
                    let href = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref() == b"src")
                        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
                        .unwrap_or_default();
                    entries.push(NavEntry {
                        depth: open_points - 1,
                        title: label.take().unwrap_or_default(),
                        href,
                    });
                }
            }
            Event::Text(e) => {
                if in_label && let Some(text) = label.as_mut() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if in_label
                    && let Some(text) = label.as_mut()
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    text.push_str(&resolved);
                }
            }
            Event::End(e) => match local_name(e.name().as_ref()) {
                b"navPoint" => open_points = open_points.saturating_sub(1),
                b"text" => in_label = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chapter, HeadingLevel};

    fn sample_tree() -> NavTree {
        NavTree::build(&[
            Chapter::new(0, "One", HeadingLevel::Primary, ""),
            Chapter::new(1, "One \"a\"", HeadingLevel::Secondary, ""),
            Chapter::new(2, "Two", HeadingLevel::Primary, ""),
        ])
    }

    #[test]
    fn test_render_head_and_points() {
        let xml = render(&sample_tree(), "urn:uuid:x", "Book & Co", Some("Ann")).unwrap();

        assert!(xml.contains(r#"<meta name="dtb:uid" content="urn:uuid:x"/>"#));
        assert!(xml.contains(r#"<meta name="dtb:depth" content="2"/>"#));
        assert!(xml.contains(r#"<meta name="dtb:totalPageCount" content="0"/>"#));
        assert!(xml.contains("<text>Book &amp; Co</text>"));
        assert!(xml.contains("<docAuthor>"));
        assert!(xml.contains(r#"<navPoint id="navPoint-1" playOrder="1">"#));
        assert!(xml.contains(r#"<navPoint id="navPoint-3" playOrder="3">"#));
        assert!(xml.contains(r#"<content src="chapter2.xhtml"/>"#));
    }

    #[test]
    fn test_no_author_no_doc_author() {
        let xml = render(&sample_tree(), "urn:uuid:x", "Book", None).unwrap();
        assert!(!xml.contains("docAuthor"));
    }

    #[test]
    fn test_flat_depth_is_one() {
        let tree = NavTree::build(&[Chapter::new(0, "Only", HeadingLevel::Primary, "")]);
        let xml = render(&tree, "u", "T", None).unwrap();
        assert!(xml.contains(r#"<meta name="dtb:depth" content="1"/>"#));
    }

    #[test]
    fn test_outline_matches_tree() {
        let tree = sample_tree();
        let xml = render(&tree, "urn:uuid:x", "Book", None).unwrap();
        assert_eq!(outline(&xml).unwrap(), tree.walk());
    }
}
