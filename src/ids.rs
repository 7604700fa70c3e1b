//! Identifier allocation.
//!
//! One random package identifier per run; every other identifier is derived
//! from role and position so the same chapters and assets always produce
//! the same manifest.

use std::fmt;

use uuid::Uuid;

/// Manifest id of the stylesheet.
pub const CSS_ID: &str = "css";
/// Manifest id of the EPUB 3 navigation document.
pub const NAV_ID: &str = "toc";
/// Manifest id of the NCX file.
pub const NCX_ID: &str = "ncx";
/// Manifest id of the cover image.
pub const COVER_IMAGE_ID: &str = "cover-image";
/// Manifest id of the cover page.
pub const COVER_PAGE_ID: &str = "cover-xhtml";

/// Manifest id of the chapter at 0-based `index`.
pub fn chapter_id(index: usize) -> String {
    format!("chapter{}", index + 1)
}

/// Manifest id of the embedded image with sequence number `index`.
pub fn image_id(index: usize) -> String {
    format!("img{index}")
}

/// Unique package identifier, formatted as `urn:uuid:<uuid v4>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookId(String);

impl BookId {
    /// Generate a fresh identifier from OS randomness.
    pub fn generate() -> Self {
        Self(format!("urn:uuid:{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 1-based navigation play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOrder(usize);

impl PlayOrder {
    pub fn new() -> Self {
        Self(1)
    }

    /// Return the current value and advance.
    pub fn next_value(&mut self) -> usize {
        let value = self.0;
        self.0 += 1;
        value
    }
}

impl Default for PlayOrder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_id_is_uuid_v4_urn() {
        let id = BookId::generate();
        let uuid = id.as_str().strip_prefix("urn:uuid:").expect("urn prefix");
        let parsed = Uuid::parse_str(uuid).expect("valid uuid");
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(parsed.get_variant(), uuid::Variant::RFC4122);

        // Version nibble and variant bits in the textual form.
        let bytes = uuid.as_bytes();
        assert_eq!(bytes[14], b'4');
        assert!(matches!(bytes[19], b'8' | b'9' | b'a' | b'b'));
    }

    #[test]
    fn test_book_ids_differ() {
        assert_ne!(BookId::generate(), BookId::generate());
    }

    #[test]
    fn test_manifest_ids() {
        assert_eq!(chapter_id(0), "chapter1");
        assert_eq!(chapter_id(9), "chapter10");
        assert_eq!(image_id(0), "img0");
        assert_eq!(image_id(12), "img12");
    }

    #[test]
    fn test_play_order_starts_at_one() {
        let mut order = PlayOrder::new();
        assert_eq!(order.next_value(), 1);
        assert_eq!(order.next_value(), 2);
        assert_eq!(order.next_value(), 3);
    }
}
