//! The packaging pipeline.

use std::io::{Cursor, Write};

use chrono::Utc;
use log::debug;

use crate::archive::{Archive, safe_filename};
use crate::assets::{AssetEmbedder, AssetFetcher};
use crate::config::PackageConfig;
use crate::error::Result;
use crate::ids::BookId;
use crate::model::{Chapter, Document, EmbeddedAsset, ImageType, SkippedAsset, non_blank};
use crate::nav::{self, NavTree};
use crate::normalize::normalize_markup;
use crate::package::{self, PackageDescriptor, PackageInput, opf};
use crate::render::{ChapterRenderer, CommonMarkRenderer};
use crate::segment::split_chapters;
use crate::templates::{DEFAULT_CSS, chapter_page, cover_page};

/// A finished EPUB.
#[derive(Debug, Clone)]
pub struct PackagedBook {
    /// Suggested file name, derived from the title.
    pub filename: String,
    /// The zip container.
    pub bytes: Vec<u8>,
    /// Images that could not be embedded and still point at their remote URL.
    pub skipped_assets: Vec<SkippedAsset>,
}

impl PackagedBook {
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.bytes)?;
        writer.flush()?;
        Ok(())
    }
}

/// Converts [`Document`]s into EPUB 3 archives.
///
/// # Example
///
/// ```no_run
/// use quire::{Document, HttpFetcher, PackageConfig, Packager};
///
/// # async fn run() -> quire::Result<()> {
/// let config = PackageConfig::default();
/// let fetcher = HttpFetcher::new(&config).expect("http client");
/// let packager = Packager::new(fetcher).with_config(config);
///
/// let doc = Document::new("Notes", "# One\n\nHello ![x](https://example.com/x.png)");
/// let book = packager.package(&doc).await?;
/// std::fs::write(&book.filename, &book.bytes)?;
/// # Ok(())
/// # }
/// ```
pub struct Packager<F> {
    fetcher: F,
    renderer: Box<dyn ChapterRenderer>,
    config: PackageConfig,
}

impl<F: AssetFetcher> Packager<F> {
    /// Packager with the CommonMark renderer and default settings.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            renderer: Box::new(CommonMarkRenderer::default()),
            config: PackageConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PackageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_renderer(mut self, renderer: impl ChapterRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// Package `document` into an EPUB.
    ///
    /// Image fetch failures do not fail the run; they are listed in
    /// [`PackagedBook::skipped_assets`]. Every call builds a new archive with
    /// a fresh package identifier.
    pub async fn package(&self, document: &Document) -> Result<PackagedBook> {
        let title = document.display_title();
        let language = non_blank(document.language.as_deref())
            .unwrap_or(self.config.default_language.as_str());

        let mut chapters = split_chapters(&document.body, title);

        let mut embedder = AssetEmbedder::new(&self.fetcher, self.config.effective_concurrency());
        let mut assets: Vec<EmbeddedAsset> = Vec::new();
        let mut skipped: Vec<SkippedAsset> = Vec::new();

        for chapter in &mut chapters {
            let html = self.renderer.render(&chapter.content);
            let embedded = embedder.embed_chapter(chapter.index, &html).await;
            chapter.normalized = Some(normalize_markup(&embedded.html));
            assets.extend(embedded.embedded);
            skipped.extend(embedded.skipped);
        }
        debug!(
            "embedded {} image(s), skipped {}",
            assets.len(),
            skipped.len()
        );

        let cover = document
            .cover
            .as_deref()
            .filter(|data| !data.is_empty())
            .map(|data| (ImageType::sniff(data).unwrap_or(ImageType::Jpeg), data));

        let book_id = BookId::generate();
        let descriptor = PackageDescriptor::build(&PackageInput {
            identifier: &book_id,
            document,
            language,
            chapters: &chapters,
            assets: &assets,
            cover: cover.map(|(media_type, _)| media_type),
            modified: Utc::now(),
        });
        descriptor.validate(&chapters, &assets)?;

        let tree = NavTree::build(&chapters);
        let author = non_blank(document.author.as_deref());

        let mut archive = Archive::new();
        let stylesheet = self.config.stylesheet.as_deref().unwrap_or(DEFAULT_CSS);
        archive.add(package::CSS_HREF, stylesheet);
        if let Some((media_type, _)) = cover {
            let page = cover_page(title, language, &package::cover_image_href(media_type));
            archive.add(package::COVER_PAGE_HREF, page);
        }
        for chapter in &chapters {
            archive.add(&chapter.filename(), chapter_document(chapter, language));
        }
        archive.add(package::NAV_HREF, nav::xhtml::render(&tree, title, language)?);
        archive.add(
            package::NCX_HREF,
            nav::ncx::render(&tree, book_id.as_str(), title, author)?,
        );
        archive.add("content.opf", opf::render(&descriptor)?);
        if let Some((media_type, data)) = cover {
            archive.add(&package::cover_image_href(media_type), data);
        }
        for asset in &assets {
            archive.add(&asset.href(), asset.data.as_slice());
        }

        let bytes = archive
            .write_to(Cursor::new(Vec::new()), self.config.compression_level)?
            .into_inner();
        debug!(
            "packaged {} chapter(s) into {} bytes",
            chapters.len(),
            bytes.len()
        );

        Ok(PackagedBook {
            filename: safe_filename(title),
            bytes,
            skipped_assets: skipped,
        })
    }
}

fn chapter_document(chapter: &Chapter, language: &str) -> String {
    let body = chapter.normalized.as_deref().unwrap_or_default();
    chapter_page(&chapter.title, language, body)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;
    use crate::assets::OfflineFetcher;
    use crate::render::HtmlPassthrough;

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = zip.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[tokio::test]
    async fn test_language_falls_back_to_config() {
        let packager = Packager::new(OfflineFetcher)
            .with_config(PackageConfig::default().with_default_language("pl"));
        let book = packager
            .package(&Document::new("Książka", "# Jeden\n\ntekst"))
            .await
            .unwrap();

        let opf = read_entry(&book.bytes, "OEBPS/content.opf");
        assert!(opf.contains("<dc:language>pl</dc:language>"));
        let chapter = read_entry(&book.bytes, "OEBPS/chapter1.xhtml");
        assert!(chapter.contains(r#"lang="pl""#));
        assert_eq!(book.filename, "Książka.epub");
    }

    #[tokio::test]
    async fn test_custom_stylesheet() {
        let packager = Packager::new(OfflineFetcher)
            .with_config(PackageConfig::default().with_stylesheet("p { color: red; }"));
        let book = packager.package(&Document::new("T", "text")).await.unwrap();
        assert_eq!(read_entry(&book.bytes, "OEBPS/styles.css"), "p { color: red; }");
    }

    #[tokio::test]
    async fn test_html_passthrough() {
        let packager = Packager::new(OfflineFetcher).with_renderer(HtmlPassthrough);
        let book = packager
            .package(&Document::new("T", "# Title\n<p>raw<br>html</p>"))
            .await
            .unwrap();
        let chapter = read_entry(&book.bytes, "OEBPS/chapter1.xhtml");
        assert!(chapter.contains("<p>raw<br/>html</p>"));
    }

    #[tokio::test]
    async fn test_empty_cover_is_ignored() {
        let packager = Packager::new(OfflineFetcher);
        let book = packager
            .package(&Document::new("T", "x").with_cover(Vec::new()))
            .await
            .unwrap();
        let zip = ZipArchive::new(Cursor::new(&book.bytes[..])).unwrap();
        assert!(zip.file_names().all(|n| n != "OEBPS/cover.xhtml"));
    }
}
