//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG) | `image` crate, format sniffed from content |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//!
//! ## Atomic writes
//!
//! Encoded bytes go to a uniquely named hidden sibling
//! (`.<name>.XXXXXX.partial`, one per writer) and are linked onto the final
//! path only once the encoder and the flush both succeed. The final step never
//! replaces an existing file: when two writers race for one output the first
//! wins and the second gets [`BackendError::AlreadyExists`]. A crash or encode
//! failure never leaves a truncated variant at the path the idempotence check
//! looks at.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{OutputFormat, ResizeParams};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// AVIF encoder speed (1 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Load and decode an image from disk, normalized to 8-bit RGB or RGBA.
///
/// Alpha is kept for sources that carry it (PNG icons); everything else is
/// flattened to RGB so the encoders see a pixel layout they all support.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let img = open_reader(path)?.decode().map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
    })?;
    Ok(if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.into_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.into_rgb8())
    })
}

/// Encode `img` into `file` using the requested format.
fn write_encoded(
    img: &DynamicImage,
    file: &mut File,
    params: &ResizeParams,
) -> Result<(), BackendError> {
    let mut writer = BufWriter::new(file);
    let result = match params.format {
        OutputFormat::Avif => {
            let quality = params.quality.value().min(100) as u8;
            let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                &mut writer,
                AVIF_SPEED,
                quality,
            );
            img.write_with_encoder(encoder)
        }
        OutputFormat::Webp => {
            let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut writer);
            img.write_with_encoder(encoder)
        }
    };
    result.map_err(|e| {
        BackendError::ProcessingFailed(format!("{} encode failed: {}", params.format, e))
    })?;
    writer.flush().map_err(BackendError::Io)
}

/// Save through a private partial file, then move it into place without
/// clobbering.
///
/// The partial file is deleted on every error path when it is dropped.
fn save_image(img: &DynamicImage, params: &ResizeParams) -> Result<(), BackendError> {
    let output = &params.output;
    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut partial = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".partial")
        .tempfile_in(dir)
        .map_err(BackendError::Io)?;
    write_encoded(img, partial.as_file_mut(), params)?;

    partial
        .persist_noclobber(output)
        .map_err(|e| match e.error.kind() {
            io::ErrorKind::AlreadyExists => BackendError::AlreadyExists(output.clone()),
            _ => BackendError::Io(e.error),
        })?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        load_image(path)
    }

    fn resize(&self, image: &DynamicImage, params: &ResizeParams) -> Result<(), BackendError> {
        let resized = image.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(&resized, params)
    }
}
