//! Batch orchestration: convert every source image under a root in parallel.
//!
//! ## Flow
//!
//! ```text
//! root/ ──discover──▶ [a.jpg, b.png, …] ──par_iter──▶ convert_file ×N ──▶ BatchReport
//!                                                         │
//!                                                         └──▶ ProcessEvent (optional channel)
//! ```
//!
//! ## Failure policy
//!
//! A root that is not a directory fails before any work. After that, per-file
//! failures never stop sibling files: every discovered file is attempted, and
//! only once all of them are done is a single [`BatchConversionError`] raised
//! listing each failed path. Zero failures means `Ok(report)`.
//!
//! Sources that would share variant names (`a.jpg` next to `a.png`) are
//! failed without being opened, all members of the group alike, so neither
//! silently claims the other's output.
//!
//! ## Parallel Processing
//!
//! Files are converted on a dedicated [rayon](https://docs.rs/rayon) pool of
//! [`effective_threads`](crate::config::effective_threads) workers. Workers
//! share nothing but the filesystem. The output-exists check is not atomic
//! across processes: running two batches over the same directory at once is
//! the caller's problem.

use crate::config::{ProcessingConfig, effective_threads};
use crate::convert::{ConversionOutcome, FileReport, convert_file};
use crate::filter::PathFilter;
use crate::imaging::{ImageBackend, OutputSettings, RustBackend};
use crate::ladder::RequestedWidths;
use crate::scan::{discover_sources, stem_collisions};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{} is not a valid directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Batch(#[from] BatchConversionError),
}

/// Aggregate of every per-file failure in a batch.
///
/// Carries the full report so callers can still see what succeeded.
#[derive(Debug)]
pub struct BatchConversionError {
    pub report: BatchReport,
}

impl BatchConversionError {
    pub fn failures(&self) -> Vec<(&Path, &str)> {
        self.report.failures()
    }
}

impl fmt::Display for BatchConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to convert:")?;
        for (path, message) in self.failures() {
            write!(f, "\n\t{}: {}", path.display(), message)?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchConversionError {}

/// Knobs for one batch, besides the root and the widths.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub filter: PathFilter,
    pub output: OutputSettings,
    pub processing: ProcessingConfig,
}

/// Every file outcome of one batch, in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub root: PathBuf,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn failures(&self) -> Vec<(&Path, &str)> {
        self.files
            .iter()
            .filter_map(|f| match &f.outcome {
                ConversionOutcome::Failed { message } => {
                    Some((f.source.as_path(), message.as_str()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.files.iter().any(|f| f.outcome.is_failed())
    }

    /// Variants written by this batch.
    pub fn generated(&self) -> usize {
        self.succeeded_counts().map(|(g, _)| g).sum()
    }

    /// Variants that were already on disk.
    pub fn existing(&self) -> usize {
        self.succeeded_counts().map(|(_, e)| e).sum()
    }

    /// Files routed away by the include/exclude filter.
    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, ConversionOutcome::Skipped { .. }))
            .count()
    }

    fn succeeded_counts(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.files.iter().filter_map(|f| match &f.outcome {
            ConversionOutcome::Succeeded {
                generated,
                existing,
                ..
            } => Some((*generated, *existing)),
            _ => None,
        })
    }
}

/// Progress events sent while a batch runs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// Discovery finished; `file_count` conversions are about to start.
    BatchStarted { root: PathBuf, file_count: usize },
    /// One file is done. Arrives in completion order, not discovery order.
    FileFinished(FileReport),
}

pub fn run(
    root: &Path,
    widths: &RequestedWidths,
    options: &BatchOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    let backend = RustBackend::new();
    run_with_backend(&backend, root, widths, options, events)
}

/// Run a batch using a specific backend (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    root: &Path,
    widths: &RequestedWidths,
    options: &BatchOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    if !root.is_dir() {
        return Err(ProcessError::NotADirectory(root.to_path_buf()));
    }

    let sources = discover_sources(root);
    if let Some(tx) = &events {
        tx.send(ProcessEvent::BatchStarted {
            root: root.to_path_buf(),
            file_count: sources.len(),
        })
        .ok();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(effective_threads(&options.processing))
        .build()?;

    let collisions = stem_collisions(
        sources
            .iter()
            .map(PathBuf::as_path)
            .filter(|p| options.filter.should_process(p)),
    );

    let files: Vec<FileReport> = pool.install(|| {
        sources
            .par_iter()
            .map(|path| {
                let report = match collisions.get(path) {
                    Some(others) => collision_report(path, others),
                    None => convert_file(backend, path, widths, &options.filter, &options.output),
                };
                if let Some(tx) = &events {
                    tx.send(ProcessEvent::FileFinished(report.clone())).ok();
                }
                report
            })
            .collect()
    });

    let report = BatchReport {
        root: root.to_path_buf(),
        files,
    };

    if report.has_failures() {
        return Err(BatchConversionError { report }.into());
    }
    Ok(report)
}

fn collision_report(path: &Path, others: &[PathBuf]) -> FileReport {
    let others: Vec<String> = others.iter().map(|p| p.display().to_string()).collect();
    FileReport {
        source: path.to_path_buf(),
        outcome: ConversionOutcome::Failed {
            message: format!("variant names collide with {}", others.join(", ")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::VariantInfo;
    use crate::filter::SkipReason;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::{
        create_test_jpeg, create_test_png_rgba, variant_names, write_corrupt_image,
    };
    use crate::variant::VariantStatus;
    use std::fs;
    use tempfile::TempDir;

    fn widths(values: &[u32]) -> RequestedWidths {
        RequestedWidths::new(values.iter().copied()).unwrap()
    }

    fn single_threaded() -> BatchOptions {
        BatchOptions {
            processing: ProcessingConfig {
                max_processes: Some(1),
            },
            ..BatchOptions::default()
        }
    }

    // =========================================================================
    // Root validation
    // =========================================================================

    #[test]
    fn missing_root_is_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let result = run(
            &tmp.path().join("nope"),
            &widths(&[100]),
            &BatchOptions::default(),
            None,
        );
        assert!(matches!(result, Err(ProcessError::NotADirectory(_))));
    }

    #[test]
    fn file_root_is_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.jpg");
        fs::write(&file, b"").unwrap();

        let backend = MockBackend::new();
        let options = BatchOptions::default();
        let result = run_with_backend(&backend, &file, &widths(&[100]), &options, None);
        assert!(matches!(result, Err(ProcessError::NotADirectory(_))));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn empty_root_succeeds_with_empty_report() {
        let tmp = TempDir::new().unwrap();
        let report = run(tmp.path(), &widths(&[100]), &BatchOptions::default(), None).unwrap();
        assert!(report.files.is_empty());
        assert_eq!(report.generated(), 0);
    }

    // =========================================================================
    // Real backend batches (tiny synthetic images)
    // =========================================================================

    #[test]
    fn one_corrupt_file_fails_batch_but_others_are_converted() {
        let tmp = TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("a.jpg"), 120, 80);
        create_test_png_rgba(&tmp.path().join("sub/b.png"), 90, 60);
        write_corrupt_image(&tmp.path().join("c.jpg"));

        let err =
            run(tmp.path(), &widths(&[50, 200]), &BatchOptions::default(), None).unwrap_err();

        let ProcessError::Batch(batch) = err else {
            panic!("expected batch error");
        };
        let corrupt = tmp.path().join("c.jpg");
        let failed: Vec<&Path> = batch.failures().into_iter().map(|(p, _)| p).collect();
        assert_eq!(failed, vec![corrupt.as_path()]);

        let message = batch.to_string();
        assert!(message.contains(&corrupt.display().to_string()));
        assert!(!message.contains("a.jpg"));
        assert!(!message.contains("b.png"));

        assert_eq!(variant_names(tmp.path()), vec!["a_100_w.avif", "a_50_w.avif"]);
        assert_eq!(
            variant_names(&tmp.path().join("sub")),
            vec!["b_50_w.avif", "b_90_w.avif"]
        );
        assert_eq!(batch.report.generated(), 4);
    }

    #[test]
    fn rerun_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("a.jpg"), 120, 80);
        let ladder = widths(&[40, 80, 300]);

        let first = run(tmp.path(), &ladder, &single_threaded(), None).unwrap();
        assert_eq!(first.generated(), 3);
        let before = fs::read(tmp.path().join("a_100_w.avif")).unwrap();

        let second = run(tmp.path(), &ladder, &single_threaded(), None).unwrap();
        assert_eq!(second.generated(), 0);
        assert_eq!(second.existing(), 3);
        assert_eq!(fs::read(tmp.path().join("a_100_w.avif")).unwrap(), before);
    }

    #[test]
    fn generated_variants_are_not_rediscovered() {
        let tmp = TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("a.jpg"), 60, 40);
        let options = BatchOptions {
            output: OutputSettings {
                format: crate::imaging::OutputFormat::Webp,
                ..OutputSettings::default()
            },
            ..BatchOptions::default()
        };

        run(tmp.path(), &widths(&[30]), &options, None).unwrap();
        let second = run(tmp.path(), &widths(&[30]), &options, None).unwrap();

        assert_eq!(second.files.len(), 1);
        assert_eq!(variant_names(tmp.path()), vec!["a_30_w.webp"]);
    }

    #[test]
    fn filter_routes_files_to_skipped() {
        let tmp = TempDir::new().unwrap();
        create_test_png_rgba(&tmp.path().join("icons/twitter.png"), 40, 40);
        create_test_png_rgba(&tmp.path().join("icons/github.png"), 40, 40);
        create_test_png_rgba(&tmp.path().join("icons/old/twitter.png"), 40, 40);

        let options = BatchOptions {
            filter: PathFilter::new(vec!["twitter".into()], vec!["/old/".into()]),
            ..BatchOptions::default()
        };
        let report = run(tmp.path(), &widths(&[20]), &options, None).unwrap();

        let outcome_of = |rel: &str| {
            report
                .files
                .iter()
                .find(|f| f.source == tmp.path().join(rel))
                .map(|f| f.outcome.clone())
                .unwrap()
        };
        assert_eq!(
            outcome_of("icons/github.png"),
            ConversionOutcome::Skipped {
                reason: SkipReason::NotIncluded
            }
        );
        assert_eq!(
            outcome_of("icons/old/twitter.png"),
            ConversionOutcome::Skipped {
                reason: SkipReason::Excluded
            }
        );
        assert_eq!(
            outcome_of("icons/twitter.png"),
            ConversionOutcome::Succeeded {
                generated: 1,
                existing: 0,
                variants: vec![VariantInfo {
                    width: 20,
                    is_final: false,
                    status: VariantStatus::Generated,
                }],
            }
        );
        assert_eq!(report.skipped(), 2);
    }

    #[test]
    fn same_stem_sources_fail_without_writing() {
        let tmp = TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("a.jpg"), 200, 100);
        create_test_png_rgba(&tmp.path().join("a.png"), 200, 200);
        create_test_jpeg(&tmp.path().join("b.jpg"), 200, 100);
        let options = BatchOptions {
            output: OutputSettings {
                format: crate::imaging::OutputFormat::Webp,
                ..OutputSettings::default()
            },
            ..BatchOptions::default()
        };

        let err = run(tmp.path(), &widths(&[100]), &options, None).unwrap_err();

        let ProcessError::Batch(batch) = err else {
            panic!("expected batch error");
        };
        let jpeg = tmp.path().join("a.jpg");
        let png = tmp.path().join("a.png");
        let failures = batch.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, jpeg.as_path());
        assert!(failures[0].1.contains(&png.display().to_string()));
        assert_eq!(failures[1].0, png.as_path());
        assert!(failures[1].1.contains(&jpeg.display().to_string()));
        assert_eq!(variant_names(tmp.path()), vec!["b_100_w.webp"]);
    }

    #[test]
    fn same_stem_sibling_filtered_out_is_no_collision() {
        let tmp = TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("a.jpg"), 60, 40);
        create_test_png_rgba(&tmp.path().join("a.png"), 60, 40);
        let options = BatchOptions {
            filter: PathFilter::new(vec![], vec![".png".into()]),
            ..BatchOptions::default()
        };

        let report = run(tmp.path(), &widths(&[30]), &options, None).unwrap();

        assert_eq!(report.generated(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(variant_names(tmp.path()), vec!["a_30_w.avif"]);
    }

    // =========================================================================
    // Events
    // =========================================================================

    #[test]
    fn emits_start_and_one_event_per_file() {
        let tmp = TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("a.jpg"), 40, 30);
        create_test_jpeg(&tmp.path().join("b.jpg"), 40, 30);

        let (tx, rx) = std::sync::mpsc::channel();
        run(tmp.path(), &widths(&[20]), &BatchOptions::default(), Some(tx)).unwrap();
        let events: Vec<ProcessEvent> = rx.iter().collect();

        assert!(matches!(
            &events[0],
            ProcessEvent::BatchStarted { file_count: 2, .. }
        ));
        let finished = events
            .iter()
            .filter(|e| matches!(e, ProcessEvent::FileFinished(_)))
            .count();
        assert_eq!(finished, 2);
    }

    #[test]
    fn batch_error_display_lists_each_failure() {
        let err = BatchConversionError {
            report: BatchReport {
                root: PathBuf::from("imgs"),
                files: vec![
                    FileReport {
                        source: PathBuf::from("imgs/x.jpg"),
                        outcome: ConversionOutcome::Failed {
                            message: "bad header".into(),
                        },
                    },
                    FileReport {
                        source: PathBuf::from("imgs/y.jpg"),
                        outcome: ConversionOutcome::Succeeded {
                            generated: 1,
                            existing: 0,
                            variants: vec![],
                        },
                    },
                    FileReport {
                        source: PathBuf::from("imgs/z.heic"),
                        outcome: ConversionOutcome::Failed {
                            message: "unsupported".into(),
                        },
                    },
                ],
            },
        };
        assert_eq!(
            err.to_string(),
            "Failed to convert:\n\timgs/x.jpg: bad header\n\timgs/z.heic: unsupported"
        );
    }
}
