//! One-time rename of artifacts from a legacy filename prefix to the current one.
//!
//! Only the first occurrence of the prefix is replaced, so `ayah_001.pcm`
//! becomes `item_001.pcm` and the extension is preserved. Planning never
//! touches the filesystem; applying never overwrites an existing file.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    /// Destination already existed; source left untouched.
    SkippedExists,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub renamed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl MigrationSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Lists planned renames for files directly inside each group directory
/// under `root`, in sorted order. A missing root yields an empty plan.
pub fn plan_renames(root: &Path, legacy_prefix: &str, new_prefix: &str) -> Result<Vec<RenamePlan>> {
    let mut plans = Vec::new();
    if !root.exists() {
        return Ok(plans);
    }
    // Depth 1 is the group directories, depth 2 their files.
    let walker = WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.with_context(|| format!("scan {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with(legacy_prefix) {
            let to = entry
                .path()
                .with_file_name(name.replacen(legacy_prefix, new_prefix, 1));
            plans.push(RenamePlan {
                from: entry.into_path(),
                to,
            });
        }
    }
    Ok(plans)
}

/// Applies one planned rename, refusing to clobber an existing destination.
pub fn apply_rename(plan: &RenamePlan) -> RenameOutcome {
    if fs::symlink_metadata(&plan.to).is_ok() {
        tracing::info!(from = %plan.from.display(), to = %plan.to.display(), "rename skipped: target exists");
        return RenameOutcome::SkippedExists;
    }
    match fs::rename(&plan.from, &plan.to) {
        Ok(()) => {
            tracing::debug!(from = %plan.from.display(), to = %plan.to.display(), "renamed");
            RenameOutcome::Renamed
        }
        Err(e) => {
            tracing::warn!(from = %plan.from.display(), "rename failed: {}", e);
            RenameOutcome::Failed(e.to_string())
        }
    }
}

/// Applies every plan in order; `on_outcome` sees each result as it happens.
pub fn apply_renames<F>(plans: &[RenamePlan], mut on_outcome: F) -> MigrationSummary
where
    F: FnMut(&RenamePlan, &RenameOutcome),
{
    let mut summary = MigrationSummary::default();
    for plan in plans {
        let outcome = apply_rename(plan);
        match outcome {
            RenameOutcome::Renamed => summary.renamed += 1,
            RenameOutcome::SkippedExists => summary.skipped += 1,
            RenameOutcome::Failed(_) => summary.failed += 1,
        }
        on_outcome(plan, &outcome);
    }
    summary
}
