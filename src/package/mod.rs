//! Package descriptor (`content.opf`).
//!
//! The descriptor is built as typed records first, checked against its own
//! invariants, and only then serialized by [`opf::render`].

pub mod opf;

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::dom::Fragment;
use crate::error::{Error, Result};
use crate::ids::{self, BookId};
use crate::model::{Chapter, Document, EmbeddedAsset, ImageType, non_blank};

pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";
pub const CSS_MEDIA_TYPE: &str = "text/css";

pub const NAV_HREF: &str = "toc.xhtml";
pub const NCX_HREF: &str = "toc.ncx";
pub const CSS_HREF: &str = "styles.css";
pub const COVER_PAGE_HREF: &str = "cover.xhtml";

/// Path of the cover image, relative to the content root.
pub fn cover_image_href(media_type: ImageType) -> String {
    format!("images/cover.{}", media_type.extension())
}

/// One `<item>` of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<&'static str>,
}

impl ManifestItem {
    fn new(id: impl Into<String>, href: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
        }
    }

    fn with_properties(mut self, properties: &'static str) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// Dublin Core and EPUB metadata of the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub title: String,
    pub language: String,
    pub creator: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub date: Option<NaiveDate>,
    pub modified: DateTime<Utc>,
    pub has_cover: bool,
}

impl PackageMetadata {
    /// `dcterms:modified` value: UTC, seconds precision.
    pub fn modified_stamp(&self) -> String {
        self.modified.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Everything the descriptor is derived from.
#[derive(Debug, Clone, Copy)]
pub struct PackageInput<'a> {
    pub identifier: &'a BookId,
    pub document: &'a Document,
    /// Resolved language tag.
    pub language: &'a str,
    pub chapters: &'a [Chapter],
    pub assets: &'a [EmbeddedAsset],
    pub cover: Option<ImageType>,
    pub modified: DateTime<Utc>,
}

/// Typed form of `content.opf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub identifier: String,
    pub metadata: PackageMetadata,
    pub manifest: Vec<ManifestItem>,
    /// Manifest ids in reading order.
    pub spine: Vec<String>,
}

impl PackageDescriptor {
    pub fn build(input: &PackageInput<'_>) -> Self {
        let doc = input.document;
        let owned = |v: Option<&str>| non_blank(v).map(str::to_string);

        let metadata = PackageMetadata {
            title: doc.display_title().to_string(),
            language: input.language.to_string(),
            creator: owned(doc.author.as_deref()),
            description: owned(doc.description.as_deref()),
            source: owned(doc.source.as_deref()),
            date: doc.date,
            modified: input.modified,
            has_cover: input.cover.is_some(),
        };

        let mut manifest: Vec<ManifestItem> = input
            .chapters
            .iter()
            .map(|ch| ManifestItem::new(ids::chapter_id(ch.index), ch.filename(), XHTML_MEDIA_TYPE))
            .collect();

        manifest.push(ManifestItem::new(ids::NAV_ID, NAV_HREF, XHTML_MEDIA_TYPE).with_properties("nav"));
        manifest.push(ManifestItem::new(ids::NCX_ID, NCX_HREF, NCX_MEDIA_TYPE));
        manifest.push(ManifestItem::new(ids::CSS_ID, CSS_HREF, CSS_MEDIA_TYPE));

        if let Some(cover) = input.cover {
            manifest.push(
                ManifestItem::new(ids::COVER_IMAGE_ID, cover_image_href(cover), cover.mime_type())
                    .with_properties("cover-image"),
            );
            manifest.push(ManifestItem::new(ids::COVER_PAGE_ID, COVER_PAGE_HREF, XHTML_MEDIA_TYPE));
        }

        manifest.extend(
            input
                .assets
                .iter()
                .map(|a| ManifestItem::new(ids::image_id(a.index), a.href(), a.media_type.mime_type())),
        );

        let mut spine = Vec::with_capacity(input.chapters.len() + 1);
        if input.cover.is_some() {
            spine.push(ids::COVER_PAGE_ID.to_string());
        }
        spine.extend(input.chapters.iter().map(|ch| ids::chapter_id(ch.index)));

        Self {
            identifier: input.identifier.to_string(),
            metadata,
            manifest,
            spine,
        }
    }

    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    /// Check the descriptor against the chapters it describes.
    ///
    /// - manifest ids and hrefs are unique
    /// - every spine entry names a manifest item
    /// - every embedded asset has exactly one manifest item whose media type
    ///   matches the file
    /// - every chapter reference to an embedded asset resolves the same way
    ///
    /// Image sources the embedder did not allocate (remote URLs left in
    /// place, relative paths written by the author) are not checked.
    ///
    /// A failure here is a packaging bug, reported as [`Error::Inconsistent`].
    pub fn validate(&self, chapters: &[Chapter], assets: &[EmbeddedAsset]) -> Result<()> {
        let mut seen_ids = HashSet::new();
        let mut seen_hrefs = HashSet::new();
        for item in &self.manifest {
            if !seen_ids.insert(item.id.as_str()) {
                return Err(Error::Inconsistent(format!("duplicate manifest id {:?}", item.id)));
            }
            if !seen_hrefs.insert(item.href.as_str()) {
                return Err(Error::Inconsistent(format!(
                    "duplicate manifest href {:?}",
                    item.href
                )));
            }
        }

        for idref in &self.spine {
            if !seen_ids.contains(idref.as_str()) {
                return Err(Error::Inconsistent(format!(
                    "spine entry {idref:?} is not in the manifest"
                )));
            }
        }

        let embedded: HashSet<String> = assets.iter().map(EmbeddedAsset::href).collect();
        for href in &embedded {
            self.check_image_reference("embedded assets", href)?;
        }

        for chapter in chapters {
            let markup = chapter.normalized.as_deref().unwrap_or(&chapter.content);
            for href in image_references(markup) {
                if embedded.contains(&href) {
                    self.check_image_reference(&chapter.filename(), &href)?;
                }
            }
        }

        Ok(())
    }

    fn check_image_reference(&self, referrer: &str, href: &str) -> Result<()> {
        let matches: Vec<&ManifestItem> = self.manifest.iter().filter(|i| i.href == href).collect();
        let [item] = matches.as_slice() else {
            return Err(Error::Inconsistent(format!(
                "{referrer} references {href:?}, which has {} manifest entries",
                matches.len()
            )));
        };

        let expected = href
            .rsplit_once('.')
            .and_then(|(_, ext)| ImageType::from_extension(ext));
        match expected {
            Some(t) if t.mime_type() == item.media_type => Ok(()),
            _ => Err(Error::Inconsistent(format!(
                "{href:?} is declared as {} in the manifest",
                item.media_type
            ))),
        }
    }
}

/// Packaged image paths referenced by `<img src>` in a chapter body.
fn image_references(markup: &str) -> Vec<String> {
    // Cheap gate only: a hit still goes through the parser below, which
    // decides what is an actual `src` value.
    if memchr::memmem::find(markup.as_bytes(), b"images/").is_none() {
        return Vec::new();
    }
    let fragment = Fragment::parse(markup);
    let dom = &fragment.dom;
    dom.descendants(fragment.body)
        .into_iter()
        .filter(|&id| dom.element_name(id).is_some_and(|n| n.as_ref() == "img"))
        .filter_map(|id| dom.get_attr(id, "src"))
        .filter(|src| src.starts_with("images/"))
        .map(str::to_string)
        .collect()
}
