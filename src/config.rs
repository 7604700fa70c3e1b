//! Packaging configuration.

use std::time::Duration;

/// Default deflate level for everything except `mimetype`.
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 6;

/// Default number of images fetched at once within a chapter.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Settings for a packaging run.
///
/// # Example
///
/// ```
/// use quire::PackageConfig;
///
/// let config = PackageConfig::default()
///     .with_compression_level(Some(9))
///     .with_fetch_concurrency(8);
/// assert_eq!(config.fetch_concurrency, 8);
/// ```
#[derive(Debug, Clone)]
pub struct PackageConfig {
    /// Deflate level (0-9). `None` uses the zip library default.
    pub compression_level: Option<i64>,
    /// Maximum in-flight image fetches per chapter. Zero is treated as one.
    pub fetch_concurrency: usize,
    /// Replacement for the built-in `styles.css`.
    pub stylesheet: Option<String>,
    /// Language tag used when the document does not declare one.
    pub default_language: String,
    /// Per-request timeout for [`HttpFetcher`](crate::HttpFetcher).
    pub fetch_timeout: Duration,
    /// User agent sent by [`HttpFetcher`](crate::HttpFetcher).
    pub user_agent: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            compression_level: Some(DEFAULT_COMPRESSION_LEVEL),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            stylesheet: None,
            default_language: "en".to_string(),
            fetch_timeout: Duration::from_secs(30),
            user_agent: concat!("quire/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl PackageConfig {
    pub fn with_compression_level(mut self, level: Option<i64>) -> Self {
        self.compression_level = level.map(|l| l.clamp(0, 9));
        self
    }

    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n;
        self
    }

    pub fn with_stylesheet(mut self, css: impl Into<String>) -> Self {
        self.stylesheet = Some(css.into());
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Concurrency actually used by the embedder.
    pub(crate) fn effective_concurrency(&self) -> usize {
        self.fetch_concurrency.max(1)
    }
}
