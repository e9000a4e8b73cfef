//! Parameter types for image operations.
//!
//! These structs describe *what* to write, not *how* to write it. They are the
//! interface between the [`variant`](crate::variant) module (which decides
//! which files must exist) and the [`backend`](super::backend) (which does the
//! actual pixel work). The split lets tests swap in a mock backend without
//! touching the ladder or idempotence logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`OutputFormat`]: The encoded format of every variant in a run.
//! - [`OutputSettings`]: Format + quality, fixed for a whole batch.
//! - [`ResizeParams`]: Everything needed to write one variant: output path,
//!   target dimensions, encoding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Encoded format of generated variants.
///
/// - `Avif`: lossy, rav1e encoder. Supported by every current browser.
/// - `Webp`: the `image` crate only ships a lossless WebP encoder, so
///   `quality` has no effect for this format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Avif,
    Webp,
}

impl OutputFormat {
    /// File extension (without the dot) used for variant files.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Avif => "avif",
            OutputFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "avif" => Ok(OutputFormat::Avif),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(format!("unknown output format '{other}' (expected avif or webp)")),
        }
    }
}

/// Encoding settings shared by every variant of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub quality: Quality,
}

/// Parameters for writing one resized variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: Quality,
}
