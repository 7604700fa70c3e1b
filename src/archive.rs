//! Zip container assembly.
//!
//! EPUB readers locate the format by sniffing the first local file header,
//! so `mimetype` is always the first entry and always stored.

use std::io::{Seek, Write};

use log::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::model::DEFAULT_TITLE;
use crate::templates::CONTAINER_XML;

pub const MIMETYPE: &str = "application/epub+zip";

/// Directory holding the package content inside the archive.
pub const CONTENT_ROOT: &str = "OEBPS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Stored,
    Deflated,
}

/// One file of the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub data: Vec<u8>,
    pub compression: Compression,
}

/// Ordered list of archive entries.
///
/// Created with the `mimetype` and `META-INF/container.xml` entries already
/// in place; everything added afterwards is deflated and lives under
/// [`CONTENT_ROOT`].
#[derive(Debug, Clone)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
}

impl Default for Archive {
    fn default() -> Self {
        Self::new()
    }
}

impl Archive {
    pub fn new() -> Self {
        Self {
            entries: vec![
                ArchiveEntry {
                    path: "mimetype".to_string(),
                    data: MIMETYPE.as_bytes().to_vec(),
                    compression: Compression::Stored,
                },
                ArchiveEntry {
                    path: "META-INF/container.xml".to_string(),
                    data: CONTAINER_XML.as_bytes().to_vec(),
                    compression: Compression::Deflated,
                },
            ],
        }
    }

    /// Add a file at `href`, relative to the content root.
    pub fn add(&mut self, href: &str, data: impl Into<Vec<u8>>) {
        self.entries.push(ArchiveEntry {
            path: format!("{CONTENT_ROOT}/{href}"),
            data: data.into(),
            compression: Compression::Deflated,
        });
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Write the zip container. `level` applies to deflated entries.
    pub fn write_to<W: Write + Seek>(&self, writer: W, level: Option<i64>) -> Result<W> {
        write_archive(&self.entries, writer, level)
    }
}

/// Write `entries` in order as a zip archive and return the inner writer.
pub fn write_archive<W: Write + Seek>(
    entries: &[ArchiveEntry],
    writer: W,
    level: Option<i64>,
) -> Result<W> {
    let mut zip = ZipWriter::new(writer);

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(level);

    for entry in entries {
        let options = match entry.compression {
            Compression::Stored => stored,
            Compression::Deflated => deflated,
        };
        zip.start_file(entry.path.as_str(), options)?;
        zip.write_all(&entry.data)?;
    }

    let writer = zip.finish()?;
    debug!("wrote archive with {} entries", entries.len());
    Ok(writer)
}

/// Output filename for a book title.
///
/// Runs of characters that are unsafe in file names (`/ \ : * ? " < > |`
/// and control characters) become a single `_`.
pub fn safe_filename(title: &str) -> String {
    let mut name = String::with_capacity(title.len() + 5);
    let mut in_run = false;
    for c in title.trim().chars() {
        if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control() {
            if !in_run {
                name.push('_');
                in_run = true;
            }
        } else {
            name.push(c);
            in_run = false;
        }
    }

    if name.trim_matches(|c: char| c == '_' || c.is_whitespace()).is_empty() {
        name = DEFAULT_TITLE.to_string();
    }
    name.push_str(".epub");
    name
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use zip::ZipArchive;

    use super::*;

    #[test]
    fn test_mimetype_first_and_stored() {
        let mut archive = Archive::new();
        archive.add("styles.css", "body {}");
        archive.add("chapter1.xhtml", "<html/>");

        let bytes = archive
            .write_to(Cursor::new(Vec::new()), Some(6))
            .unwrap()
            .into_inner();

        // Local file header of the first entry names `mimetype` at offset 30,
        // followed by the extra field and the uncompressed payload.
        assert_eq!(&bytes[0..4], b"PK\x03\x04");
        assert_eq!(&bytes[30..38], b"mimetype");
        let extra = u16::from_le_bytes([bytes[28], bytes[29]]) as usize;
        let data = 38 + extra;
        assert_eq!(&bytes[data..data + MIMETYPE.len()], MIMETYPE.as_bytes());

        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<_> = zip.file_names().map(str::to_string).collect();
        assert_eq!(names.len(), 4);

        let first = zip.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        drop(first);

        let mut css = zip.by_name("OEBPS/styles.css").unwrap();
        assert_eq!(css.compression(), CompressionMethod::Deflated);
        let mut text = String::new();
        css.read_to_string(&mut text).unwrap();
        assert_eq!(text, "body {}");
    }

    #[test]
    fn test_entry_order_preserved() {
        let mut archive = Archive::new();
        for href in ["styles.css", "chapter1.xhtml", "toc.xhtml", "content.opf"] {
            archive.add(href, Vec::new());
        }
        let paths: Vec<_> = archive.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "mimetype",
                "META-INF/container.xml",
                "OEBPS/styles.css",
                "OEBPS/chapter1.xhtml",
                "OEBPS/toc.xhtml",
                "OEBPS/content.opf",
            ]
        );
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("My Book"), "My Book.epub");
        assert_eq!(safe_filename("a/b\\c: d?"), "a_b_c_ d_.epub");
        assert_eq!(safe_filename("x<>|\"y"), "x_y.epub");
        assert_eq!(safe_filename("tab\there"), "tab_here.epub");
        assert_eq!(safe_filename("   "), "Untitled.epub");
        assert_eq!(safe_filename("???"), "Untitled.epub");
        assert_eq!(safe_filename("Zażółć gęślą"), "Zażółć gęślą.epub");
    }
}
