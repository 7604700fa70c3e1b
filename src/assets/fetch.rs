//! Remote asset retrieval.

use async_trait::async_trait;

use crate::error::FetchError;

/// Raw bytes of a fetched asset plus whatever type the server declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl FetchedAsset {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_string),
        }
    }
}

/// Source of remote image bytes.
///
/// A failed fetch is never fatal: the embedder logs it, reports it and
/// leaves the reference in place.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedAsset, FetchError>;
}

#[async_trait]
impl<F: AssetFetcher + ?Sized> AssetFetcher for std::sync::Arc<F> {
    async fn fetch(&self, url: &str) -> Result<FetchedAsset, FetchError> {
        (**self).fetch(url).await
    }
}

/// Reject anything that is not an `http` or `https` URL.
pub(crate) fn check_scheme(url: &str) -> Result<(), FetchError> {
    let scheme = url.split_once(':').map(|(s, _)| s).unwrap_or("");
    if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") {
        Ok(())
    } else {
        Err(FetchError::Unsupported(url.to_string()))
    }
}

/// Fetcher that never succeeds. Images stay remote.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

#[async_trait]
impl AssetFetcher for OfflineFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedAsset, FetchError> {
        check_scheme(url)?;
        Err(FetchError::Transport("offline".to_string()))
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use async_trait::async_trait;
    use reqwest::header::CONTENT_TYPE;

    use super::{AssetFetcher, FetchedAsset, check_scheme};
    use crate::config::PackageConfig;
    use crate::error::FetchError;

    /// [`AssetFetcher`] backed by a shared `reqwest::Client`.
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: reqwest::Client,
    }

    impl HttpFetcher {
        /// Build a client with the timeout and user agent from `config`.
        pub fn new(config: &PackageConfig) -> Result<Self, FetchError> {
            let client = reqwest::Client::builder()
                .timeout(config.fetch_timeout)
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            Ok(Self { client })
        }

        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl AssetFetcher for HttpFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedAsset, FetchError> {
            check_scheme(url)?;

            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(FetchError::Status(resp.status().as_u16()));
            }

            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            Ok(FetchedAsset {
                bytes: bytes.to_vec(),
                content_type,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_scheme() {
        assert!(check_scheme("http://example.com/a.png").is_ok());
        assert!(check_scheme("HTTPS://example.com/a.png").is_ok());
        assert_eq!(
            check_scheme("file:///etc/passwd"),
            Err(FetchError::Unsupported("file:///etc/passwd".to_string()))
        );
        assert!(check_scheme("images/local.png").is_err());
    }

    #[tokio::test]
    async fn test_offline_fetcher_fails() {
        let err = OfflineFetcher.fetch("https://example.com/a.png").await;
        assert_eq!(err, Err(FetchError::Transport("offline".to_string())));
        let err = OfflineFetcher.fetch("ftp://example.com/a.png").await;
        assert!(matches!(err, Err(FetchError::Unsupported(_))));
    }
}
