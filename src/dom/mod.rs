//! HTML fragment parsing and XHTML serialization.
//!
//! Chapter bodies arrive as lenient HTML. They are parsed with html5ever
//! into an [`ArenaDom`], edited in place, and written back out as XHTML
//! with [`serialize_children`].

mod arena;
mod serialize;
mod tree_sink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;

pub use arena::{ArenaDom, Attribute, NodeData, NodeId};
pub use serialize::{VOID_ELEMENTS, is_void_element, serialize_children};
pub use tree_sink::ArenaSink;

/// A parsed chapter body.
pub struct Fragment {
    pub dom: ArenaDom,
    /// The `<body>` element holding the fragment's nodes.
    pub body: NodeId,
}

impl Fragment {
    /// Parse an HTML fragment as the content of a `<body>` element.
    ///
    /// Scripting is treated as disabled so `<noscript>` content is parsed as
    /// markup rather than raw text.
    pub fn parse(html: &str) -> Self {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                scripting_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };

        let wrapped = format!("<!DOCTYPE html><html><head></head><body>{html}</body></html>");
        let dom = parse_document(ArenaSink::new(), opts)
            .from_utf8()
            .one(wrapped.as_bytes())
            .into_dom();
        let body = dom.find_by_tag("body").unwrap_or(dom.document());
        Self { dom, body }
    }

    /// Serialize the body's children as XHTML.
    pub fn to_xhtml(&self) -> String {
        serialize_children(&self.dom, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_round_trip() {
        let fragment = Fragment::parse("<p>One<br>Two</p>");
        assert_eq!(fragment.to_xhtml(), "<p>One<br/>Two</p>");
    }

    #[test]
    fn test_noscript_is_parsed_as_markup() {
        let fragment = Fragment::parse("<noscript><img src=\"a.png\"></noscript>");
        assert_eq!(
            fragment.to_xhtml(),
            "<noscript><img src=\"a.png\"/></noscript>"
        );
    }
}
