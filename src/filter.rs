//! Include/exclude rules deciding which source files take part in a batch.
//!
//! Both lists are literal, case-sensitive substrings matched against the full
//! path string. Exclusion always wins: a path matching both lists is skipped.
//! When a path fails both checks it is reported as not included.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Why a discovered file was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// An include list was given and the path matched none of it.
    NotIncluded,
    /// The path contains an exclude substring.
    Excluded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotIncluded => f.write_str("not included"),
            SkipReason::Excluded => f.write_str("excluded"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl PathFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Route a path: `Ok(())` to process it, `Err(reason)` to skip it.
    pub fn check(&self, path: &Path) -> Result<(), SkipReason> {
        let path = path.to_string_lossy();

        if !self.include.is_empty() && !self.include.iter().any(|inc| path.contains(inc.as_str())) {
            return Err(SkipReason::NotIncluded);
        }
        if self.exclude.iter().any(|exc| path.contains(exc.as_str())) {
            return Err(SkipReason::Excluded);
        }
        Ok(())
    }

    pub fn should_process(&self, path: &Path) -> bool {
        self.check(path).is_ok()
    }
}
