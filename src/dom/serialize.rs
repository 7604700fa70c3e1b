//! XHTML serialization of an [`ArenaDom`] subtree.

use html5ever::{Namespace, ns};
use quick_xml::escape::{escape, partial_escape};

use super::arena::{ArenaDom, NodeData, NodeId};
use crate::xml::xml_chars;

/// HTML elements that never have content and must be self-closed in XHTML.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Elements whose first newline is swallowed by the HTML parser.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

/// Serialize the children of `parent` as well-formed XHTML.
///
/// Text is written with literal characters; only `&`, `<` and `>` are
/// escaped, and characters XML forbids are dropped. Attribute values are always double-quoted. Comments and
/// doctypes are not written.
pub fn serialize_children(dom: &ArenaDom, parent: NodeId) -> String {
    let mut out = String::new();
    for child in dom.children(parent) {
        write_node(dom, child, &ns!(html), &mut out);
    }
    out
}

fn write_node(dom: &ArenaDom, id: NodeId, parent_ns: &Namespace, out: &mut String) {
    let Some(node) = dom.get(id) else {
        return;
    };

    match &node.data {
        NodeData::Text(text) => out.push_str(&partial_escape(&*xml_chars(text))),
        NodeData::Element { name, attrs, .. } => {
            let local = name.local.as_ref();
            if !is_xml_name(local) {
                // Lenient tokenizing can produce tag names like `a<b`; keep
                // the content and drop the tag.
                for child in dom.children(id) {
                    write_node(dom, child, parent_ns, out);
                }
                return;
            }
            out.push('<');
            out.push_str(local);

            if name.ns != *parent_ns && name.ns != ns!(html) {
                if name.ns == ns!(svg) {
                    out.push_str(r#" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink""#);
                } else if name.ns == ns!(mathml) {
                    out.push_str(r#" xmlns="http://www.w3.org/1998/Math/MathML""#);
                }
            }

            for attr in attrs {
                let attr_local = attr.name.local.as_ref();
                // Namespace declarations are synthesized above.
                if !is_xml_name(attr_local) || attr_local == "xmlns" || attr.name.ns == ns!(xmlns) {
                    continue;
                }
                out.push(' ');
                if let Some(prefix) = &attr.name.prefix {
                    out.push_str(prefix.as_ref());
                    out.push(':');
                }
                out.push_str(attr_local);
                out.push_str("=\"");
                out.push_str(&escape(&*xml_chars(&attr.value)));
                out.push('"');
            }

            if name.ns == ns!(html) && is_void_element(local) {
                out.push_str("/>");
                return;
            }
            out.push('>');

            if LEADING_NEWLINE_ELEMENTS.contains(&local)
                && dom
                    .children(id)
                    .next()
                    .and_then(|first| dom.text_content(first))
                    .is_some_and(|t| t.starts_with('\n'))
            {
                out.push('\n');
            }

            for child in dom.children(id) {
                write_node(dom, child, &name.ns, out);
            }

            out.push_str("</");
            out.push_str(local);
            out.push('>');
        }
        NodeData::Comment(_) | NodeData::Doctype | NodeData::Document => {}
    }
}

/// Conservative XML name check for attribute names coming from lenient HTML.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
