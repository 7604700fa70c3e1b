//! # quire
//!
//! Package Markdown documents into EPUB 3 ebooks.
//!
//! ## Features
//!
//! - Splits a flat Markdown body into chapters at `#` and `##` headings
//! - Downloads remote images and stores them inside the book
//! - Writes an EPUB 3 navigation document plus an EPUB 2 NCX, both built
//!   from one navigation tree
//! - Produces well-formed XHTML from lenient rendered HTML
//! - Optional cover page, language and accessibility metadata
//!
//! ## Quick Start
//!
//! ```no_run
//! use quire::{Document, HttpFetcher, PackageConfig, Packager};
//!
//! # async fn run() -> quire::Result<()> {
//! let config = PackageConfig::default();
//! let packager = Packager::new(HttpFetcher::new(&config).expect("client"))
//!     .with_config(config);
//!
//! let doc = Document::new("Field Notes", "# Day one\n\nIt rained.\n\n## Later\n\nIt stopped.")
//!     .with_author("A. Writer");
//! let book = packager.package(&doc).await?;
//! book.write_to(std::fs::File::create(&book.filename)?)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Offline packaging
//!
//! Any [`AssetFetcher`] can be plugged in. [`OfflineFetcher`] never fetches,
//! so every remote image stays a remote reference and is reported in
//! [`PackagedBook::skipped_assets`]:
//!
//! ```
//! use quire::{Document, OfflineFetcher, Packager};
//!
//! # futures::executor::block_on(async {
//! let doc = Document::new("Offline", "# One\n\n![x](https://example.com/x.png)");
//! let book = Packager::new(OfflineFetcher).package(&doc).await.unwrap();
//! assert_eq!(book.filename, "Offline.epub");
//! assert_eq!(book.skipped_assets.len(), 1);
//! # });
//! ```

pub mod archive;
pub mod assets;
pub mod config;
pub mod dom;
pub mod error;
pub mod ids;
pub mod model;
pub mod nav;
pub mod normalize;
pub mod package;
pub mod packager;
pub mod render;
pub mod segment;
pub mod templates;
pub(crate) mod util;
pub(crate) mod xml;

pub use assets::{AssetEmbedder, AssetFetcher, FetchedAsset, OfflineFetcher};
#[cfg(feature = "http")]
pub use assets::HttpFetcher;
pub use config::PackageConfig;
pub use error::{Error, FetchError, Result};
pub use model::{Chapter, Document, EmbeddedAsset, HeadingLevel, ImageType, SkippedAsset};
pub use normalize::normalize_markup;
pub use packager::{PackagedBook, Packager};
pub use render::{ChapterRenderer, CommonMarkRenderer, HtmlPassthrough};
pub use util::decode_text;
