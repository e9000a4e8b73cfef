//! CLI output formatting for batch runs.
//!
//! Each event has a `format_*` function returning `Vec<String>` for
//! testability; the binary prints the lines. Format functions are pure, no
//! I/O, no side effects.
//!
//! ```text
//! Generating scaled images for 3 files in 'images/icons'...
//!     Skipping not included images/icons/github.png
//!     Generated 1 images and skipped 0 images for 'images/icons/twitter.png'.
//!         100px: generated
//!     Failed to process images/icons/broken.png: failed to read ...
//! Done: 1 generated, 0 existing, 1 skipped, 1 failed
//! ```
//!
//! Files whose variants all existed already print nothing, so a re-run over an
//! unchanged tree is quiet.

use crate::convert::{ConversionOutcome, FileReport};
use crate::process::{BatchReport, ProcessEvent};
use crate::variant::VariantStatus;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format one file's outcome.
pub fn format_file_report(report: &FileReport) -> Vec<String> {
    let path = report.source.display();
    match &report.outcome {
        ConversionOutcome::Skipped { reason } => {
            vec![format!("{}Skipping {} {}", indent(1), reason, path)]
        }
        ConversionOutcome::Succeeded {
            generated: 0, ..
        } => Vec::new(),
        ConversionOutcome::Succeeded {
            generated,
            existing,
            variants,
        } => {
            let mut lines = vec![format!(
                "{}Generated {} images and skipped {} images for '{}'.",
                indent(1),
                generated,
                existing,
                path
            )];
            for variant in variants {
                let status = match variant.status {
                    VariantStatus::Existing => "existing",
                    VariantStatus::Generated => "generated",
                };
                let label = if variant.is_final {
                    format!("{}px (final)", variant.width)
                } else {
                    format!("{}px", variant.width)
                };
                lines.push(format!("{}{}: {}", indent(2), label, status));
            }
            lines
        }
        ConversionOutcome::Failed { message } => {
            vec![format!("{}Failed to process {}: {}", indent(1), path, message)]
        }
    }
}

pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { root, file_count } => vec![format!(
            "Generating scaled images for {} files in '{}'...",
            file_count,
            root.display()
        )],
        ProcessEvent::FileFinished(report) => format_file_report(report),
    }
}

/// One-line totals for a finished batch.
pub fn format_batch_summary(report: &BatchReport) -> String {
    format!(
        "Done: {} generated, {} existing, {} skipped, {} failed",
        report.generated(),
        report.existing(),
        report.skipped(),
        report.failures().len()
    )
}

pub fn print_batch_summary(report: &BatchReport) {
    println!("{}", format_batch_summary(report));
}
