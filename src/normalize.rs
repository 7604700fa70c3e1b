//! Markup normalization.
//!
//! Rendered chapter HTML is lenient: void elements without a closing slash,
//! named character references that XML does not know, and artifacts that
//! upstream renderers inject. [`normalize_markup`] turns it into strict,
//! well-formed XHTML suitable for an EPUB content document.

use crate::dom::{Fragment, NodeId};

/// Elements removed together with their content.
///
/// Raw-text elements have no safe XHTML form and are never valid in a
/// packaged chapter body.
const DROPPED_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "template",
];

/// Class marking the separator rule some Markdown footnote plugins emit.
const FOOTNOTE_SEPARATOR_CLASS: &str = "footnotes-sep";

/// Normalize a chapter body into well-formed XHTML.
///
/// - character references are decoded to literal text (only `&`, `<`, `>`
///   and attribute quotes stay escaped)
/// - void elements (`br`, `hr`, `img`, ...) are written self-closed
/// - `<hr class="footnotes-sep">` separators and script-like elements are
///   removed
///
/// The function is idempotent.
///
/// # Example
///
/// ```
/// use quire::normalize_markup;
///
/// let html = r#"<p>a<br>b&nbsp;c</p><hr class="footnotes-sep"><hr>"#;
/// assert_eq!(normalize_markup(html), "<p>a<br/>b\u{a0}c</p><hr/>");
/// ```
pub fn normalize_markup(html: &str) -> String {
    let mut fragment = Fragment::parse(html);

    let doomed: Vec<NodeId> = fragment
        .dom
        .descendants(fragment.body)
        .into_iter()
        .filter(|&id| is_foreign_artifact(&fragment, id))
        .collect();

    for id in doomed {
        fragment.dom.detach(id);
    }

    fragment.to_xhtml()
}

fn is_foreign_artifact(fragment: &Fragment, id: NodeId) -> bool {
    let Some(name) = fragment.dom.element_name(id) else {
        return false;
    };
    let name = name.as_ref();
    if DROPPED_ELEMENTS.contains(&name) {
        return true;
    }
    name == "hr"
        && fragment
            .dom
            .element_classes(id)
            .iter()
            .any(|c| c == FOOTNOTE_SEPARATOR_CLASS)
}
