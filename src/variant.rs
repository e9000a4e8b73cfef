//! Variant resizer: make sure one (source, width) output file exists.
//!
//! Variants live next to their source and are named
//! `<stem>_<width>_w.<ext>`. The filesystem is the only state: if the output
//! path exists, the variant is done and its content is never touched again.
//! Deleting a variant file is how to force it to be regenerated.
//!
//! ```text
//! images/portfolio/
//! ├── dawn.jpg
//! ├── dawn_400_w.avif
//! ├── dawn_800_w.avif
//! └── dawn_1000_w.avif    # final width, capped from 1500
//! ```

use crate::imaging::{BackendError, Dimensions, ImageBackend, OutputSettings, ResizeParams};
use crate::ladder::{EffectiveWidth, scaled_height};
use image::DynamicImage;
use serde::Serialize;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Substring that marks a file name as a generated variant (`dawn_400_w.avif`).
pub const VARIANT_MARKER: &str = "_w.";

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to read {path}: {source}")]
    Identify {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("failed to write {width}px variant {output}: {source}")]
    Write {
        width: u32,
        output: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// A source image opened for one run.
///
/// Dimensions come from the file header. Pixels are decoded on first use and
/// then shared by every variant, so a file whose variants all exist is never
/// decoded at all.
pub struct SourceImage {
    path: PathBuf,
    dimensions: Dimensions,
    pixels: OnceCell<DynamicImage>,
}

impl SourceImage {
    /// Read the header of `path` to learn its native dimensions.
    pub fn open(backend: &impl ImageBackend, path: &Path) -> Result<Self, EncodeError> {
        let dimensions = backend.identify(path).map_err(|source| EncodeError::Identify {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            dimensions,
            pixels: OnceCell::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn pixels(&self, backend: &impl ImageBackend) -> Result<&DynamicImage, EncodeError> {
        if let Some(pixels) = self.pixels.get() {
            return Ok(pixels);
        }
        let decoded = backend.decode(&self.path).map_err(|source| EncodeError::Decode {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.pixels.get_or_init(|| decoded))
    }
}

/// Whether a variant was already on disk or written by this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantStatus {
    Existing,
    Generated,
}

/// One planned output file for a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub width: EffectiveWidth,
    pub height: u32,
    pub output: PathBuf,
}

/// Output path for `source` at `width`: same directory, `<stem>_<width>_w.<ext>`.
pub fn variant_path(source: &Path, width: u32, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}_{width}_w.{extension}"))
}

/// Plan the variant of `source` at `width` without touching the filesystem.
pub fn plan_variant(
    source: &SourceImage,
    width: EffectiveWidth,
    settings: &OutputSettings,
) -> Variant {
    let dims = source.dimensions();
    Variant {
        width,
        height: scaled_height((dims.width, dims.height), width.width),
        output: variant_path(source.path(), width.width, settings.format.extension()),
    }
}

/// Make sure the variant of `source` at `width` exists on disk.
///
/// Returns [`VariantStatus::Existing`] without decoding when the output path
/// is already present, and also when another writer completes the same output
/// while this one is encoding. An existing file is never overwritten.
pub fn ensure_variant(
    backend: &impl ImageBackend,
    source: &SourceImage,
    width: EffectiveWidth,
    settings: &OutputSettings,
) -> Result<VariantStatus, EncodeError> {
    let variant = plan_variant(source, width, settings);
    if variant.output.exists() {
        return Ok(VariantStatus::Existing);
    }

    let pixels = source.pixels(backend)?;
    let params = ResizeParams {
        output: variant.output.clone(),
        width: width.width,
        height: variant.height,
        format: settings.format,
        quality: settings.quality,
    };
    match backend.resize(pixels, &params) {
        Ok(()) => Ok(VariantStatus::Generated),
        Err(BackendError::AlreadyExists(_)) => Ok(VariantStatus::Existing),
        Err(source) => Err(EncodeError::Write {
            width: width.width,
            output: variant.output,
            source,
        }),
    }
}
