//! Shared test utilities: synthetic source images and variant listings.
//!
//! Fixtures are generated on the fly with the `image` encoders instead of
//! being checked in, so tests can pick exact dimensions.

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::path::Path;

fn create_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    create_parent(path);
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Create a small valid RGBA PNG with a transparent left half.
pub fn create_test_png_rgba(path: &Path, width: u32, height: u32) {
    create_parent(path);
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if x < width / 2 { 0 } else { 255 };
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 200, alpha])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::png::PngEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
}

/// Write bytes that no decoder accepts.
pub fn write_corrupt_image(path: &Path) {
    create_parent(path);
    std::fs::write(path, b"definitely not an image").unwrap();
}

/// Sorted names of generated variants directly inside `dir`.
pub fn variant_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(crate::variant::VARIANT_MARKER))
        .collect();
    names.sort();
    names
}
