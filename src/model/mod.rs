//! Core data model for document packaging.
//!
//! This module contains:
//! - The input [`Document`] and its metadata
//! - [`Chapter`] records produced by segmentation
//! - [`EmbeddedAsset`] payloads and their [`ImageType`]

mod asset;
mod chapter;
mod document;

pub use asset::{EmbeddedAsset, ImageType, SkippedAsset};
pub use chapter::{Chapter, HeadingLevel};
pub use document::{DEFAULT_TITLE, Document};
pub(crate) use document::non_blank;
