//! EPUB 3 navigation document (`toc.xhtml`).

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{NavEntry, NavNode, NavTree};
use crate::error::Result;
use crate::xml::{EPUB_OPS_NS, HTML_DOCTYPE, XHTML_NS, XML_DECLARATION, XmlDoc, local_name, resolve_entity};

/// Render the navigation document for `tree`.
pub fn render(tree: &NavTree, title: &str, language: &str) -> Result<String> {
    let mut doc = XmlDoc::new(&[XML_DECLARATION, HTML_DOCTYPE]);

    doc.open(
        "html",
        &[
            ("xmlns", XHTML_NS),
            ("xmlns:epub", EPUB_OPS_NS),
            ("lang", language),
            ("xml:lang", language),
        ],
    )?;
    doc.open("head", &[])?;
    doc.empty("meta", &[("charset", "utf-8")])?;
    doc.text_element("title", &[], title)?;
    doc.empty("link", &[("rel", "stylesheet"), ("href", "styles.css")])?;
    doc.close("head")?;

    doc.open("body", &[])?;
    doc.text_element("h1", &[], title)?;
    doc.open("nav", &[("epub:type", "toc"), ("role", "doc-toc"), ("id", "toc")])?;
    write_list(&mut doc, tree.roots())?;
    doc.close("nav")?;
    doc.close("body")?;
    doc.close("html")?;

    doc.finish()
}

fn write_list(doc: &mut XmlDoc, nodes: &[NavNode]) -> Result<()> {
    // An empty <ol> is invalid in a nav document.
    if nodes.is_empty() {
        return Ok(());
    }
    doc.open("ol", &[])?;
    for node in nodes {
        doc.open("li", &[])?;
        doc.text_element("a", &[("href", &node.href)], &node.title)?;
        write_list(doc, &node.children)?;
        doc.close("li")?;
    }
    doc.close("ol")
}

/// Read the link outline back out of a rendered navigation document.
///
/// Depth is the `<ol>` nesting level of each link, starting at 0.
pub fn outline(xml: &str) -> Result<Vec<NavEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut list_depth = 0usize;
    let mut current: Option<(String, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"ol" => list_depth += 1,
                b"a" => {
                    let href = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref() == b"href")
                        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
                        .unwrap_or_default();
                    current = Some((href, String::new()));
                }
                _ => {}
            },
            Event::Text(e) => {
                if let Some((_, title)) = current.as_mut() {
                    title.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if let Some((_, title)) = current.as_mut()
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    title.push_str(&resolved);
                }
            }
            Event::End(e) => match local_name(e.name().as_ref()) {
                b"ol" => list_depth = list_depth.saturating_sub(1),
                b"a" => {
                    if let Some((href, title)) = current.take() {
                        entries.push(NavEntry {
                            depth: list_depth.saturating_sub(1),
                            title,
                            href,
                        });
                    }
                }
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
            Chapter::new(0, "Part & Parcel", HeadingLevel::Primary, ""),
            Chapter::new(1, "Sub <one>", HeadingLevel::Secondary, ""),
            Chapter::new(2, "Part Two", HeadingLevel::Primary, ""),
        ])
    }

    #[test]
    fn test_render_structure() {
        let xml = render(&sample_tree(), "My Book", "en").unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE html>\n<html"));
        assert!(xml.contains(r#"xmlns:epub="http://www.idpf.org/2007/ops""#));
        assert!(xml.contains(r#"<nav epub:type="toc" role="doc-toc" id="toc">"#));
        assert!(xml.contains("<h1>My Book</h1>"));
        assert!(xml.contains(r#"<a href="chapter1.xhtml">Part &amp; Parcel</a>"#));
        assert_eq!(xml.matches("<ol>").count(), 2);
    }

    #[test]
    fn test_outline_matches_tree() {
        let tree = sample_tree();
        let xml = render(&tree, "My Book", "en").unwrap();
        assert_eq!(outline(&xml).unwrap(), tree.walk());
    }

    #[test]
    fn test_empty_tree_has_no_list() {
        let xml = render(&NavTree::default(), "Empty", "en").unwrap();
        assert!(!xml.contains("<ol"));
        assert!(outline(&xml).unwrap().is_empty());
    }
}
