//! File-level conversion: filter → ladder → variants for one source image.
//!
//! [`convert_file`] never returns an error. Whatever happens to one file is
//! folded into a [`ConversionOutcome`] so the batch can keep going and report
//! everything at the end.

use crate::filter::{PathFilter, SkipReason};
use crate::imaging::{ImageBackend, OutputSettings};
use crate::ladder::{RequestedWidths, compute_ladder};
use crate::variant::{EncodeError, SourceImage, VariantStatus, ensure_variant};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Status of one ladder entry after conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantInfo {
    pub width: u32,
    pub is_final: bool,
    pub status: VariantStatus,
}

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Skipped {
        reason: SkipReason,
    },
    Succeeded {
        generated: usize,
        existing: usize,
        variants: Vec<VariantInfo>,
    },
    Failed {
        message: String,
    },
}

impl ConversionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ConversionOutcome::Failed { .. })
    }
}

/// A source path together with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: ConversionOutcome,
}

/// Convert one source image into its ladder of variants.
///
/// Filtered paths are skipped before the file is opened. Widths are handled
/// in ascending order and the walk ends at the final (capped) entry. The first
/// error aborts the remaining widths of this file and becomes
/// [`ConversionOutcome::Failed`]; variants written before it stay on disk.
pub fn convert_file(
    backend: &impl ImageBackend,
    path: &Path,
    widths: &RequestedWidths,
    filter: &PathFilter,
    settings: &OutputSettings,
) -> FileReport {
    let outcome = match filter.check(path) {
        Err(reason) => ConversionOutcome::Skipped { reason },
        Ok(()) => match generate_variants(backend, path, widths, settings) {
            Ok(variants) => {
                let generated = variants
                    .iter()
                    .filter(|v| v.status == VariantStatus::Generated)
                    .count();
                ConversionOutcome::Succeeded {
                    generated,
                    existing: variants.len() - generated,
                    variants,
                }
            }
            Err(e) => ConversionOutcome::Failed {
                message: e.to_string(),
            },
        },
    };

    FileReport {
        source: path.to_path_buf(),
        outcome,
    }
}

fn generate_variants(
    backend: &impl ImageBackend,
    path: &Path,
    widths: &RequestedWidths,
    settings: &OutputSettings,
) -> Result<Vec<VariantInfo>, EncodeError> {
    let source = SourceImage::open(backend, path)?;
    let ladder = compute_ladder(source.dimensions().width, widths);

    ladder
        .into_iter()
        .map(|width| {
            let status = ensure_variant(backend, &source, width, settings)?;
            Ok(VariantInfo {
                width: width.width,
                is_final: width.is_final,
                status,
            })
        })
        .collect()
}
