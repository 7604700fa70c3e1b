//! Error types for quire operations.

use thiserror::Error;

/// Errors that abort a packaging run.
///
/// Per-asset fetch failures are not represented here: they are reported
/// through [`FetchError`] and never stop a run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML writing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The package descriptor broke one of its own invariants.
    ///
    /// This is a bug in the packager, not a problem with the input document.
    #[error("inconsistent package (this is a bug): {0}")]
    Inconsistent(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The asset fetcher could not be set up (for example the HTTP client).
    #[error("fetcher setup failed: {0}")]
    Fetcher(#[from] FetchError),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single remote asset could not be embedded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("unsupported URL scheme: {0}")]
    Unsupported(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("not a supported image (content type {0:?})")]
    Undecodable(Option<String>),
}
