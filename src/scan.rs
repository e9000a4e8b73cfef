//! Source discovery: find every image under a root that needs a ladder.
//!
//! A file is a source when its extension is one of [`SOURCE_EXTENSIONS`]
//! (case-insensitive) and its name does not carry the
//! [`VARIANT_MARKER`](crate::variant::VARIANT_MARKER), so previously generated
//! variants are never fed back in as sources.
//!
//! Results are sorted by path so batch reports come out in a stable order.
//! Entries the walker cannot read (permissions, dangling links) are skipped.
//!
//! Variant names drop the source extension, so `a.jpg` and `a.png` in one
//! directory would both own `a_400_w.avif`. [`stem_collisions`] finds such
//! groups so the batch can refuse them instead of letting one overwrite or
//! shadow the other.

use crate::variant::VARIANT_MARKER;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Raster photo extensions accepted as sources.
///
/// HEIC is listed so such files show up in the report; the pure-Rust decoder
/// stack cannot read them, so they end up as failures.
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic"];

/// Whether `path` names a source image (not a generated variant).
pub fn is_source_candidate(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.contains(VARIANT_MARKER) {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SOURCE_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

/// Recursively list source images under `root`.
pub fn discover_sources(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_source_candidate(p))
        .collect()
}

/// Sources sharing a directory and a file stem with at least one other source.
///
/// Maps each such source to the sources it collides with, in input order.
pub fn stem_collisions<'a>(
    sources: impl IntoIterator<Item = &'a Path>,
) -> BTreeMap<PathBuf, Vec<PathBuf>> {
    let mut groups: BTreeMap<(PathBuf, OsString), Vec<PathBuf>> = BTreeMap::new();
    for path in sources {
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let stem = path.file_stem().map(OsString::from).unwrap_or_default();
        groups.entry((parent, stem)).or_default().push(path.to_path_buf());
    }

    let mut collisions = BTreeMap::new();
    for group in groups.into_values().filter(|g| g.len() > 1) {
        for path in &group {
            let others = group.iter().filter(|p| *p != path).cloned().collect();
            collisions.insert(path.clone(), others);
        }
    }
    collisions
}
