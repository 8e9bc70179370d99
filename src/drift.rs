//! Drift detection between a fresh bundle and an output directory
//!
//! CI regenerates the bundle in memory and compares it with the committed
//! schema directory. Files the bundle would write but the directory lacks
//! are missing, differing files are changed, and `*-schema.json` files the
//! bundle no longer produces are stale.

use std::fs;
use std::path::Path;

use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use walkdir::WalkDir;

use crate::error::Result;
use crate::writer::ArtifactSet;

/// Suffix shared by every schema file the bundle writes
const SCHEMA_SUFFIX: &str = "-schema.json";

/// One changed file
#[derive(Debug, Clone, Serialize)]
pub struct FileDiff {
    pub name: String,
    pub added_lines: usize,
    pub removed_lines: usize,
    /// Unified diff from the file on disk to the generated content
    pub diff: String,
}

/// Outcome of a drift check
#[derive(Debug, Clone, Default, Serialize)]
pub struct DriftReport {
    pub missing: Vec<String>,
    pub changed: Vec<FileDiff>,
    pub stale: Vec<String>,
    pub unchanged: usize,
}

impl DriftReport {
    pub fn has_drift(&self) -> bool {
        self.drift_count() > 0
    }

    pub fn drift_count(&self) -> usize {
        self.missing.len() + self.changed.len() + self.stale.len()
    }
}

/// Compare `artifacts` with the files in `dir`
pub fn check_directory(artifacts: &ArtifactSet, dir: &Path) -> Result<DriftReport> {
    let mut report = DriftReport::default();

    for artifact in artifacts.iter() {
        let path = dir.join(&artifact.name);
        if !path.is_file() {
            report.missing.push(artifact.name);
            continue;
        }

        let on_disk = fs::read_to_string(&path)?;
        if on_disk == artifact.content {
            report.unchanged += 1;
        } else {
            report.changed.push(diff_file(&artifact.name, &on_disk, &artifact.content));
        }
    }

    if dir.is_dir() {
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.ends_with(SCHEMA_SUFFIX) && !artifacts.contains(&name) {
                report.stale.push(name.into_owned());
            }
        }
        report.stale.sort();
    }

    Ok(report)
}

fn diff_file(name: &str, old: &str, new: &str) -> FileDiff {
    let diff = TextDiff::from_lines(old, new);

    let mut added_lines = 0;
    let mut removed_lines = 0;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added_lines += 1,
            ChangeTag::Delete => removed_lines += 1,
            ChangeTag::Equal => {}
        }
    }

    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", name), &format!("b/{}", name))
        .to_string();

    FileDiff {
        name: name.to_string(),
        added_lines,
        removed_lines,
        diff: unified,
    }
}
