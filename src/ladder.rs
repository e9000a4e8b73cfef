//! Width ladder policy: which widths to generate for one source image.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Rule
//!
//! Requested widths are walked in ascending order. Every width that fits under
//! the native width is emitted as-is. The first width that would upscale is
//! replaced by the native width rounded down to a multiple of 100, marked
//! *final*, and the walk stops there:
//!
//! ```text
//! native 1000px, requested [400, 800, 1500, 2200]
//!   400  → 400
//!   800  → 800
//!   1500 → 1000 (final, stop)
//! ```
//!
//! When every requested width fits, no final entry is produced and the ladder
//! is exactly the requested widths.

use serde::Serialize;
use thiserror::Error;

/// Multiple the final (capped) width is rounded down to.
pub const CAP_ROUNDING: u32 = 100;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WidthsError {
    #[error("at least one target width is required")]
    Empty,
    #[error("target widths must be positive")]
    Zero,
}

/// Target widths requested by the caller: non-empty, positive, de-duplicated,
/// ascending.
///
/// The ladder walk relies on ascending order to find the first upscaling
/// width, so the type only exists in sorted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedWidths(Vec<u32>);

impl RequestedWidths {
    pub fn new(widths: impl IntoIterator<Item = u32>) -> Result<Self, WidthsError> {
        let mut widths: Vec<u32> = widths.into_iter().collect();
        if widths.is_empty() {
            return Err(WidthsError::Empty);
        }
        if widths.contains(&0) {
            return Err(WidthsError::Zero);
        }
        widths.sort_unstable();
        widths.dedup();
        Ok(Self(widths))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

/// One entry of a realized ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectiveWidth {
    pub width: u32,
    /// Capped from a requested width that exceeded the native width. Always
    /// the last entry of its ladder.
    pub is_final: bool,
}

impl EffectiveWidth {
    pub fn normal(width: u32) -> Self {
        Self {
            width,
            is_final: false,
        }
    }

    pub fn capped(width: u32) -> Self {
        Self {
            width,
            is_final: true,
        }
    }
}

/// Round `value` down to the nearest multiple of `multiple`.
pub fn round_down_to_nearest(value: u32, multiple: u32) -> u32 {
    (value / multiple) * multiple
}

/// Compute the ladder of widths to generate for an image `native_width` wide.
///
/// The capped width is `floor(native / 100) * 100`, with two adjustments that
/// keep the ladder usable, applied in this order:
/// - never zero: images narrower than 100px cap at their native width
/// - never below the previously emitted width (the ladder stays weakly
///   ascending, e.g. native 1050 with requested 1020 and 1500)
pub fn compute_ladder(native_width: u32, requested: &RequestedWidths) -> Vec<EffectiveWidth> {
    let mut ladder: Vec<EffectiveWidth> = Vec::with_capacity(requested.as_slice().len());

    for &width in requested.as_slice() {
        if width > native_width {
            let mut capped = round_down_to_nearest(native_width, CAP_ROUNDING);
            if capped == 0 {
                capped = native_width;
            }
            if let Some(previous) = ladder.last() {
                capped = capped.max(previous.width);
            }
            ladder.push(EffectiveWidth::capped(capped));
            break;
        }
        ladder.push(EffectiveWidth::normal(width));
    }

    ladder
}

/// Height of a variant `target_width` wide, preserving the aspect ratio.
///
/// `round(native_height * target_width / native_width)`, never below 1px.
pub fn scaled_height(native: (u32, u32), target_width: u32) -> u32 {
    let (native_w, native_h) = native;
    if native_w == 0 {
        return native_h.max(1);
    }
    let h = (native_h as f64 * target_width as f64 / native_w as f64).round() as u32;
    h.max(1)
}
