use std::fmt;

/// Image formats that can be embedded in a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Jpeg,
    Png,
    Gif,
    Webp,
    Svg,
}

impl ImageType {
    /// Get the MIME type string for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
            ImageType::Gif => "image/gif",
            ImageType::Webp => "image/webp",
            ImageType::Svg => "image/svg+xml",
        }
    }

    /// File extension used for generated filenames.
    pub fn extension(self) -> &'static str {
        match self {
            ImageType::Jpeg => "jpg",
            ImageType::Png => "png",
            ImageType::Gif => "gif",
            ImageType::Webp => "webp",
            ImageType::Svg => "svg",
        }
    }

    /// Inverse of [`extension`](Self::extension); also accepts `jpeg`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageType::Jpeg),
            "png" => Some(ImageType::Png),
            "gif" => Some(ImageType::Gif),
            "webp" => Some(ImageType::Webp),
            "svg" => Some(ImageType::Svg),
            _ => None,
        }
    }

    /// Map a `Content-Type` header value to an image type.
    ///
    /// Parameters (`; charset=...`) are ignored and matching is
    /// case-insensitive. Returns `None` for anything outside the supported set.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageType::Jpeg),
            "image/png" => Some(ImageType::Png),
            "image/gif" => Some(ImageType::Gif),
            "image/webp" => Some(ImageType::Webp),
            "image/svg+xml" => Some(ImageType::Svg),
            _ => None,
        }
    }

    /// Detect the image type from magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageType::Jpeg);
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageType::Png);
        }
        if data.starts_with(b"GIF8") {
            return Some(ImageType::Gif);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageType::Webp);
        }
        let head = &data[..data.len().min(512)];
        if memchr::memmem::find(head, b"<svg").is_some() {
            return Some(ImageType::Svg);
        }
        None
    }

    /// Resolve the type of a fetched payload: header first, then magic bytes.
    pub fn detect(content_type: Option<&str>, data: &[u8]) -> Option<Self> {
        content_type
            .and_then(Self::from_content_type)
            .or_else(|| Self::sniff(data))
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// A remote image that was fetched and will be stored under `images/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedAsset {
    /// Document-wide sequence number; the `N` in `image<N>.<ext>`.
    pub index: usize,
    pub filename: String,
    pub media_type: ImageType,
    pub data: Vec<u8>,
    /// The URL the image was fetched from.
    pub source: String,
}

impl EmbeddedAsset {
    /// Path relative to the content root, as written into chapter markup.
    pub fn href(&self) -> String {
        format!("images/{}", self.filename)
    }
}

/// A remote image that could not be embedded.
///
/// Its reference is left unrewritten in the chapter markup, so the packaged
/// book still points at the remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct SkippedAsset {
    /// Index of the chapter that referenced the image.
    pub chapter: usize,
    pub url: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_type() {
        assert_eq!(
            ImageType::from_content_type("image/PNG; charset=binary"),
            Some(ImageType::Png)
        );
        assert_eq!(
            ImageType::from_content_type("image/svg+xml"),
            Some(ImageType::Svg)
        );
        assert_eq!(ImageType::from_content_type("text/html"), None);
        assert_eq!(ImageType::from_content_type("image/avif"), None);
    }

    #[test]
    fn test_sniff_magic_bytes() {
        assert_eq!(
            ImageType::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageType::Jpeg)
        );
        assert_eq!(
            ImageType::sniff(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            Some(ImageType::Png)
        );
        assert_eq!(ImageType::sniff(b"GIF89a"), Some(ImageType::Gif));
        assert_eq!(ImageType::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageType::Webp));
        assert_eq!(
            ImageType::sniff(b"<?xml version=\"1.0\"?><svg xmlns=\"\"/>"),
            Some(ImageType::Svg)
        );
        assert_eq!(ImageType::sniff(b"<html></html>"), None);
    }

    #[test]
    fn test_detect_prefers_header() {
        let png = [0x89, 0x50, 0x4E, 0x47];
        assert_eq!(
            ImageType::detect(Some("image/gif"), &png),
            Some(ImageType::Gif)
        );
        assert_eq!(
            ImageType::detect(Some("application/octet-stream"), &png),
            Some(ImageType::Png)
        );
        assert_eq!(ImageType::detect(None, b"hello"), None);
    }

    #[test]
    fn test_extension_and_href() {
        let asset = EmbeddedAsset {
            index: 3,
            filename: format!("image3.{}", ImageType::Jpeg.extension()),
            media_type: ImageType::Jpeg,
            data: vec![],
            source: "https://example.com/a.jpg".into(),
        };
        assert_eq!(asset.href(), "images/image3.jpg");
    }
}
