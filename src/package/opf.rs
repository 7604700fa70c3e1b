//! `content.opf` serialization.

use super::PackageDescriptor;
use crate::error::Result;
use crate::ids;
use crate::xml::{XML_DECLARATION, XmlDoc};

const OPF_NS: &str = "http://www.idpf.org/2007/opf";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const BOOK_ID: &str = "bookid";

/// Fixed accessibility metadata, as `(property, value)` pairs.
const ACCESSIBILITY: &[(&str, &str)] = &[
    ("schema:accessMode", "textual"),
    ("schema:accessMode", "visual"),
    ("schema:accessibilityFeature", "structuralNavigation"),
    ("schema:accessibilityFeature", "tableOfContents"),
    ("schema:accessibilityHazard", "none"),
    (
        "schema:accessibilitySummary",
        "This publication conforms to WCAG 2.0 Level A.",
    ),
    ("schema:accessModeSufficient", "textual"),
];

/// Serialize the descriptor as an OPF 3.0 package document.
pub fn render(desc: &PackageDescriptor) -> Result<String> {
    let meta = &desc.metadata;
    let mut doc = XmlDoc::new(&[XML_DECLARATION]);

    doc.open(
        "package",
        &[
            ("xmlns", OPF_NS),
            ("unique-identifier", BOOK_ID),
            ("version", "3.0"),
            ("xml:lang", &meta.language),
        ],
    )?;

    doc.open("metadata", &[("xmlns:dc", DC_NS)])?;
    doc.text_element("dc:identifier", &[("id", BOOK_ID)], &desc.identifier)?;
    doc.text_element("dc:title", &[], &meta.title)?;
    doc.text_element("dc:language", &[], &meta.language)?;

    let optional = [
        ("dc:creator", meta.creator.clone()),
        ("dc:description", meta.description.clone()),
        ("dc:source", meta.source.clone()),
        ("dc:date", meta.date.map(|d| d.format("%Y-%m-%d").to_string())),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            doc.text_element(name, &[], &value)?;
        }
    }

    doc.text_element(
        "meta",
        &[("property", "dcterms:modified")],
        &meta.modified_stamp(),
    )?;
    if meta.has_cover {
        doc.empty("meta", &[("name", "cover"), ("content", ids::COVER_IMAGE_ID)])?;
    }
    for (property, value) in ACCESSIBILITY {
        doc.text_element("meta", &[("property", property)], value)?;
    }
    doc.close("metadata")?;

    doc.open("manifest", &[])?;
    for item in &desc.manifest {
        let mut attrs = vec![
            ("id", item.id.as_str()),
            ("href", item.href.as_str()),
            ("media-type", item.media_type.as_str()),
        ];
        if let Some(properties) = item.properties {
            attrs.push(("properties", properties));
        }
        doc.empty("item", &attrs)?;
    }
    doc.close("manifest")?;

    doc.open("spine", &[("toc", ids::NCX_ID)])?;
    for idref in &desc.spine {
        doc.empty("itemref", &[("idref", idref)])?;
    }
    doc.close("spine")?;

    doc.close("package")?;
    doc.finish()
}
