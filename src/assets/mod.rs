//! Remote image embedding.
//!
//! Every `<img src>` in a chapter that points at a remote resource is
//! fetched and stored in the package under `images/`. Sequence numbers are
//! handed out in the order images appear in the document, so numbering is
//! stable no matter which fetch finishes first.

mod fetch;

use futures::stream::{self, StreamExt};
use log::{debug, warn};

use crate::dom::{Fragment, NodeId};
use crate::error::FetchError;
use crate::model::{EmbeddedAsset, ImageType, SkippedAsset};

pub use fetch::{AssetFetcher, FetchedAsset, OfflineFetcher};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;

/// Document-wide image sequence. Starts at 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssetCounter(usize);

impl AssetCounter {
    pub fn new() -> Self {
        Self(0)
    }

    /// Take the next sequence number.
    pub fn allocate(&mut self) -> usize {
        let n = self.0;
        self.0 += 1;
        n
    }

    /// Number of values handed out so far.
    pub fn allocated(&self) -> usize {
        self.0
    }
}

/// Result of embedding one chapter's images.
#[derive(Debug, Clone, Default)]
pub struct ChapterAssets {
    /// Chapter markup with successful references rewritten.
    pub html: String,
    pub embedded: Vec<EmbeddedAsset>,
    pub skipped: Vec<SkippedAsset>,
}

/// Fetches and embeds images chapter by chapter.
///
/// One embedder is used per packaging run; its counter spans all chapters.
pub struct AssetEmbedder<'a> {
    fetcher: &'a dyn AssetFetcher,
    counter: AssetCounter,
    concurrency: usize,
}

impl<'a> AssetEmbedder<'a> {
    pub fn new(fetcher: &'a dyn AssetFetcher, concurrency: usize) -> Self {
        Self {
            fetcher,
            counter: AssetCounter::new(),
            concurrency: concurrency.max(1),
        }
    }

    pub fn counter(&self) -> AssetCounter {
        self.counter
    }

    /// Embed the images referenced by one chapter's HTML.
    ///
    /// Fetches run concurrently, bounded by the configured concurrency.
    /// Results are consumed in encounter order. A failed fetch leaves its
    /// `src` untouched and is reported in [`ChapterAssets::skipped`].
    pub async fn embed_chapter(&mut self, chapter: usize, html: &str) -> ChapterAssets {
        let mut fragment = Fragment::parse(html);
        let targets = collect_image_sources(&fragment);

        if targets.is_empty() {
            return ChapterAssets {
                html: html.to_string(),
                ..Default::default()
            };
        }

        debug!("chapter {chapter}: fetching {} image(s)", targets.len());

        let fetcher = self.fetcher;
        let results: Vec<Result<FetchedAsset, FetchError>> =
            stream::iter(targets.iter().map(|(_, url)| fetcher.fetch(url)))
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut out = ChapterAssets::default();
        for ((node, url), result) in targets.into_iter().zip(results) {
            let fetched = result.and_then(|asset| {
                match ImageType::detect(asset.content_type.as_deref(), &asset.bytes) {
                    Some(media_type) => Ok((media_type, asset.bytes)),
                    None => Err(FetchError::Undecodable(asset.content_type)),
                }
            });

            match fetched {
                Ok((media_type, data)) => {
                    let index = self.counter.allocate();
                    let asset = EmbeddedAsset {
                        index,
                        filename: format!("image{index}.{}", media_type.extension()),
                        media_type,
                        data,
                        source: url,
                    };
                    fragment.dom.set_attr(node, "src", &asset.href());
                    out.embedded.push(asset);
                }
                Err(err) => {
                    warn!("chapter {chapter}: skipping image {url}: {err}");
                    out.skipped.push(SkippedAsset {
                        chapter,
                        url,
                        reason: err.to_string(),
                    });
                }
            }
        }

        out.html = if out.embedded.is_empty() {
            html.to_string()
        } else {
            fragment.to_xhtml()
        };
        out
    }
}

/// `<img>` elements with a fetchable `src`, in document order.
fn collect_image_sources(fragment: &Fragment) -> Vec<(NodeId, String)> {
    let dom = &fragment.dom;
    dom.descendants(fragment.body)
        .into_iter()
        .filter(|&id| dom.element_name(id).is_some_and(|n| n.as_ref() == "img"))
        .filter_map(|id| {
            let src = dom.get_attr(id, "src")?.trim();
            if src.is_empty() || is_data_uri(src) {
                return None;
            }
            Some((id, src.to_string()))
        })
        .collect()
}

fn is_data_uri(src: &str) -> bool {
    src.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0];

    /// In-memory fetcher with per-URL delay and outcome.
    #[derive(Default)]
    struct ScriptedFetcher {
        responses: HashMap<String, (u64, Result<FetchedAsset, FetchError>)>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn respond(mut self, url: &str, delay_ms: u64, result: Result<FetchedAsset, FetchError>) -> Self {
            self.responses.insert(url.to_string(), (delay_ms, result));
            self
        }
    }

    #[async_trait]
    impl AssetFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedAsset, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let (delay, result) = self
                .responses
                .get(url)
                .cloned()
                .unwrap_or((0, Err(FetchError::Status(404))));
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    #[test]
    fn test_counter() {
        let mut counter = AssetCounter::new();
        assert_eq!(counter.allocate(), 0);
        assert_eq!(counter.allocate(), 1);
        assert_eq!(counter.allocated(), 2);
    }

    #[test]
    fn test_collect_skips_data_and_empty() {
        let fragment = Fragment::parse(concat!(
            r#"<p><img src="https://a/1.png"><img src=""><img src="DATA:image/png;base64,AA">"#,
            r#"<img alt="no src"><img src=" https://a/2.png "></p>"#,
        ));
        let urls: Vec<_> = collect_image_sources(&fragment)
            .into_iter()
            .map(|(_, u)| u)
            .collect();
        assert_eq!(urls, ["https://a/1.png", "https://a/2.png"]);
    }

    #[tokio::test]
    async fn test_encounter_order_despite_completion_order() {
        let fetcher = ScriptedFetcher::default()
            .respond("https://x/slow.png", 60, Ok(FetchedAsset::new(PNG, Some("image/png"))))
            .respond("https://x/fast.jpg", 0, Ok(FetchedAsset::new(JPEG, Some("image/jpeg"))));

        let mut embedder = AssetEmbedder::new(&fetcher, 4);
        let out = embedder
            .embed_chapter(
                0,
                r#"<p><img src="https://x/slow.png"></p><p><img src="https://x/fast.jpg"></p>"#,
            )
            .await;

        assert_eq!(out.embedded.len(), 2);
        assert_eq!(out.embedded[0].filename, "image0.png");
        assert_eq!(out.embedded[0].source, "https://x/slow.png");
        assert_eq!(out.embedded[1].filename, "image1.jpg");
        assert_eq!(
            out.html,
            r#"<p><img src="images/image0.png"/></p><p><img src="images/image1.jpg"/></p>"#
        );
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_left_unrewritten() {
        let fetcher = ScriptedFetcher::default()
            .respond("https://x/ok.png", 0, Ok(FetchedAsset::new(PNG, None)))
            .respond("https://x/gone.png", 0, Err(FetchError::Status(404)));

        let mut embedder = AssetEmbedder::new(&fetcher, 2);
        let out = embedder
            .embed_chapter(
                3,
                r#"<img src="https://x/gone.png"><img src="https://x/ok.png">"#,
            )
            .await;

        assert_eq!(out.embedded.len(), 1);
        assert_eq!(out.embedded[0].filename, "image0.png");
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].chapter, 3);
        assert_eq!(out.skipped[0].url, "https://x/gone.png");
        assert_eq!(out.skipped[0].reason, "HTTP status 404");
        assert_eq!(
            out.html,
            r#"<img src="https://x/gone.png"/><img src="images/image0.png"/>"#
        );
    }

    #[tokio::test]
    async fn test_undecodable_payload_skipped() {
        let fetcher = ScriptedFetcher::default().respond(
            "https://x/page",
            0,
            Ok(FetchedAsset::new(&b"<html>not an image</html>"[..], Some("text/html"))),
        );

        let mut embedder = AssetEmbedder::new(&fetcher, 1);
        let html = r#"<p><img src="https://x/page"></p>"#;
        let out = embedder.embed_chapter(0, html).await;

        assert!(out.embedded.is_empty());
        assert_eq!(out.html, html);
        assert_eq!(
            out.skipped[0].reason,
            FetchError::Undecodable(Some("text/html".to_string())).to_string()
        );
        assert_eq!(embedder.counter().allocated(), 0);
    }

    #[tokio::test]
    async fn test_counter_spans_chapters_and_duplicates() {
        let fetcher = ScriptedFetcher::default()
            .respond("https://x/a.png", 0, Ok(FetchedAsset::new(PNG, Some("image/png"))));

        let mut embedder = AssetEmbedder::new(&fetcher, 4);
        let first = embedder
            .embed_chapter(0, r#"<img src="https://x/a.png"><img src="https://x/a.png">"#)
            .await;
        let second = embedder.embed_chapter(1, r#"<img src="https://x/a.png">"#).await;

        let names: Vec<_> = first
            .embedded
            .iter()
            .chain(&second.embedded)
            .map(|a| a.filename.as_str())
            .collect();
        assert_eq!(names, ["image0.png", "image1.png", "image2.png"]);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_concurrency_bound() {
        let mut fetcher = ScriptedFetcher::default();
        let mut html = String::new();
        for i in 0..6 {
            let url = format!("https://x/{i}.png");
            fetcher = fetcher.respond(&url, 20, Ok(FetchedAsset::new(PNG, None)));
            html.push_str(&format!(r#"<img src="{url}">"#));
        }

        let mut embedder = AssetEmbedder::new(&fetcher, 2);
        let out = embedder.embed_chapter(0, &html).await;

        assert_eq!(out.embedded.len(), 6);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_no_images_returns_input() {
        let fetcher = ScriptedFetcher::default();
        let mut embedder = AssetEmbedder::new(&fetcher, 4);
        let html = "<p>plain<br>text</p>";
        let out = embedder.embed_chapter(0, html).await;
        assert_eq!(out.html, html);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }
}
