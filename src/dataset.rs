// src/dataset.rs
//
// Dataset discovery and file I/O around the core transform. The newest
// *.json under `<root>/json/` is the working collection; outputs are written
// next to their inputs under a refreshed timestamp so successive runs never
// overwrite each other.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::info;
use walkdir::WalkDir;

use crate::records::{AmbiguityRecord, ImageRecord};

static DATE_STAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}(_\d{2}-\d{2}-\d{2})?").expect("valid date pattern")
});

/// Picks the most recently modified JSON collection under `<root>/json/`.
pub fn find_latest_collection(root: &Path) -> Result<PathBuf> {
    let json_dir = root.join("json");
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in WalkDir::new(&json_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
        let Some(modified) = modified else { continue };
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, path.to_path_buf()));
        }
    }

    let (_, path) = newest.with_context(|| {
        format!("no dataset JSON found under {}", json_dir.display())
    })?;
    info!("Using dataset collection: {}", path.display());
    Ok(path)
}

pub fn load_records(path: &Path) -> Result<Vec<ImageRecord>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<ImageRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(records)
}

pub fn save_records(path: &Path, records: &[ImageRecord]) -> Result<()> {
    let contents = serde_json::to_string_pretty(records)?;
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote {} image records to {}", records.len(), path.display());
    Ok(())
}

pub fn save_ambiguities(path: &Path, ambiguities: &[AmbiguityRecord]) -> Result<()> {
    let contents = serde_json::to_string_pretty(ambiguities)?;
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        "Wrote {} ambiguity records to {}",
        ambiguities.len(),
        path.display()
    );
    Ok(())
}

/// Refreshes the timestamp embedded in a file name, or appends one.
///
/// An existing `YYYY-MM-DD` or `YYYY-MM-DD_HH-MM-SS` stamp anywhere in the
/// name is replaced with `stamp`; otherwise `_<stamp>` is inserted before
/// the extension (or appended when there is none).
pub fn stamp_file_name(name: &str, stamp: &str) -> String {
    if DATE_STAMP.is_match(name) {
        return DATE_STAMP.replace_all(name, stamp).into_owned();
    }
    match name.rsplit_once('.') {
        Some((base, extension)) => format!("{base}_{stamp}.{extension}"),
        None => format!("{name}_{stamp}"),
    }
}

/// `stamp_file_name` applied to a path's file name, in place.
pub fn stamp_path(path: &Path, stamp: &str) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    path.with_file_name(stamp_file_name(name, stamp))
}
