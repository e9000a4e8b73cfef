//! Configuration module.
//!
//! Handles loading and validating `srcset.toml`. Every value has a stock
//! default, so the file is optional and may be sparse.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [images]
//! widths = [400, 800, 1500, 2200] # Ladder used when a job sets no widths
//! format = "avif"                 # "avif" (lossy) or "webp" (lossless)
//! quality = 90                    # AVIF quality (1-100)
//!
//! [processing]
//! max_processes = 4               # Max parallel workers (omit for auto = CPU cores)
//!
//! [[jobs]]
//! root = "images/portfolio"       # Relative to this file's directory
//!
//! [[jobs]]
//! root = "images/icons"
//! widths = [100]
//! include = ["instagram", "twitter"]
//! exclude = []
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, OutputSettings, Quality};
use crate::ladder::RequestedWidths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name looked up by the CLI.
pub const CONFIG_FILENAME: &str = "srcset.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration loaded from `srcset.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SrcsetConfig {
    /// Default ladder and encoding settings.
    pub images: ImagesConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Directories processed by `srcset-gen run`, in order.
    pub jobs: Vec<JobConfig>,
}

impl SrcsetConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        check_widths("images.widths", &self.images.widths)?;
        for (i, job) in self.jobs.iter().enumerate() {
            if let Some(widths) = &job.widths {
                check_widths(&format!("jobs[{i}].widths"), widths)?;
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Encoding settings for every variant of a run.
    pub fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            format: self.images.format,
            quality: Quality::new(self.images.quality),
        }
    }

    /// Ladder for `job`, falling back to `images.widths`.
    pub fn widths_for(&self, job: &JobConfig) -> Result<RequestedWidths, ConfigError> {
        let widths = job.widths.as_ref().unwrap_or(&self.images.widths);
        RequestedWidths::new(widths.iter().copied())
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }
}

fn check_widths(key: &str, widths: &[u32]) -> Result<(), ConfigError> {
    RequestedWidths::new(widths.iter().copied())
        .map(|_| ())
        .map_err(|e| ConfigError::Validation(format!("{key}: {e}")))
}

/// Ladder and encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Target widths in pixels. Sorted and de-duplicated before use.
    pub widths: Vec<u32>,
    /// Encoded format of every variant.
    pub format: OutputFormat,
    /// Lossy encoding quality (1-100). Ignored for lossless WebP.
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            widths: vec![400, 800, 1500, 2200],
            format: OutputFormat::default(),
            quality: Quality::default().value(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// One directory to process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Root directory, relative paths resolved against the config file.
    pub root: PathBuf,
    /// Overrides `images.widths` for this job.
    #[serde(default)]
    pub widths: Option<Vec<u32>>,
    /// Only paths containing one of these substrings are processed.
    #[serde(default)]
    pub include: Vec<String>,
    /// Paths containing any of these substrings are skipped.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Load config from `path`.
///
/// A missing file yields the stock defaults. Relative job roots are resolved
/// against the directory that contains the file.
pub fn load_config(path: &Path) -> Result<SrcsetConfig, ConfigError> {
    if !path.exists() {
        return Ok(SrcsetConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let mut config: SrcsetConfig = toml::from_str(&content)?;
    config.validate()?;

    let base = path.parent().unwrap_or(Path::new(""));
    for job in &mut config.jobs {
        if job.root.is_relative() {
            job.root = base.join(&job.root);
        }
    }
    Ok(config)
}

/// A documented `srcset.toml` with every option at its stock value.
pub fn stock_config_toml() -> &'static str {
    r#"# srcset-gen configuration
# All options are optional. Values shown are the defaults.

[images]
# Target widths in pixels. Widths wider than a source image are replaced by
# the source width rounded down to a multiple of 100, and larger widths are
# dropped.
widths = [400, 800, 1500, 2200]
# Output format: "avif" (lossy) or "webp". WebP output is always lossless
# (the only WebP encoder available here), ignores `quality`, and produces far
# larger files than AVIF. Use it only where AVIF cannot be served.
format = "avif"
# AVIF encoding quality (1-100).
quality = 90

[processing]
# Maximum number of parallel workers. Omit to use every CPU core.
# max_processes = 4

# Directories processed by `srcset-gen run`. Relative paths are resolved
# against the directory containing this file.
#
# [[jobs]]
# root = "images/portfolio"
#
# [[jobs]]
# root = "images/icons"
# widths = [100]
# include = ["instagram", "twitter"]
# exclude = []
"#
}
