//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Decode** | `image` (JPEG, PNG) |
//! | **Resize → AVIF / WebP** | Lanczos3 + rav1e / lossless WebP |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use params::{OutputFormat, OutputSettings, Quality, ResizeParams};
pub use rust_backend::RustBackend;
