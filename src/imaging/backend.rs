//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the pipeline needs:
//! identify (header-only dimension read), decode, and resize-and-encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust, statically
//! linked, no system libraries.

use super::params::ResizeParams;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    /// Another writer finished the output first. The file on disk is left as is.
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` because one backend instance is shared by every worker of a batch.
pub trait ImageBackend: Sync {
    /// Get image dimensions without decoding pixel data.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode the full image into a pixel buffer.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Resize an already-decoded image and write the encoded result.
    ///
    /// Never replaces an existing file at `params.output`: if one is there by
    /// the time the write completes, returns [`BackendError::AlreadyExists`].
    fn resize(&self, image: &DynamicImage, params: &ResizeParams) -> Result<(), BackendError>;
}
