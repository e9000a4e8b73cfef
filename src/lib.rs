//! # srcset-gen
//!
//! Generates a ladder of downscaled, re-encoded copies of every photo in a
//! directory tree, so a browser can pick the smallest adequate image from a
//! `srcset`. Variants are written next to their source:
//!
//! ```text
//! images/portfolio/
//! ├── dawn.jpg            # source, 1000px wide
//! ├── dawn_400_w.avif
//! ├── dawn_800_w.avif
//! └── dawn_1000_w.avif    # 1500 requested, capped at the native width
//! ```
//!
//! # Architecture: Per-File Pipeline
//!
//! ```text
//! process::run ──▶ scan (discover) ──▶ convert_file (parallel, one per file)
//!                                          ├─ filter   include/exclude routing
//!                                          ├─ ladder   which widths to produce
//!                                          └─ variant  ensure each output file exists
//! ```
//!
//! The filesystem is the only state. A variant whose output file exists is
//! never re-encoded, which makes interrupted runs resumable and re-runs cheap.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`process`] | Batch orchestrator: discovery, parallel dispatch, aggregate failure |
//! | [`convert`] | File-level converter: filter + ladder + variants → outcome |
//! | [`variant`] | Variant naming, existence check, resize + encode of one width |
//! | [`ladder`] | Width ladder policy (no upscaling, capped final width) |
//! | [`filter`] | Include/exclude substring rules |
//! | [`scan`] | Recursive discovery of source images |
//! | [`imaging`] | Pure-Rust decode/resize/encode backend |
//! | [`config`] | `srcset.toml` loading and validation |
//! | [`output`] | CLI output formatting of batch events |
//!
//! # Design Decisions
//!
//! ## No Upscaling
//!
//! Widths larger than the source would only add bytes without adding detail.
//! The first such width is replaced by the native width rounded down to a
//! multiple of 100 and ends the ladder, so every image still gets one
//! near-native "largest" variant with a clean number in its name.
//!
//! ## Report, Don't Abort
//!
//! One unreadable photo must not stop a batch of thousands. Per-file failures
//! become outcomes; the batch raises a single error listing them all once
//! every file has been attempted.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling, and AVIF encoding all come from the `image`
//! crate (rav1e for AVIF). No ImageMagick, no libvips, no system packages.

pub mod config;
pub mod convert;
pub mod filter;
pub mod imaging;
pub mod ladder;
pub mod output;
pub mod process;
pub mod scan;
pub mod variant;

#[cfg(test)]
pub(crate) mod test_helpers;
