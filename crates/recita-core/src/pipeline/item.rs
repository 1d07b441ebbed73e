//! One unit of work: resolve, skip-if-present, fetch, convert, clean up.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::Position;
use crate::retry::run_with_retry;

use super::summary::{ItemOutcome, ItemReport};
use super::Pipeline;

/// Everything derived for one global index before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub global: u32,
    pub position: Position,
    pub source_url: String,
    pub intermediate_path: PathBuf,
    pub final_path: PathBuf,
}

/// Removes a file if it exists; a missing file is not an error.
fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "could not remove file: {}", e),
    }
}

impl Pipeline {
    /// Derives the work item for `global`; fails only when the index is out of range.
    pub fn plan_item(&self, global: u32) -> Result<WorkItem> {
        let position = self.catalog.locate(global)?;
        let intermediate_path = if self.options.keep_source {
            self.layout.kept_source_path(position)
        } else {
            self.layout.scratch_path(global, position)
        };
        Ok(WorkItem {
            global,
            position,
            source_url: self.layout.source_url(global),
            intermediate_path,
            final_path: self.layout.final_path(position),
        })
    }

    /// Processes one global index. Never panics on I/O failure: every error
    /// becomes [`ItemOutcome::Failed`] and the item's partial files are removed.
    pub fn process_item(&self, global: u32) -> ItemReport {
        let item = match self.plan_item(global) {
            Ok(item) => item,
            Err(e) => {
                return ItemReport {
                    global,
                    position: None,
                    final_path: None,
                    outcome: ItemOutcome::Failed(format!("{:#}", e)),
                }
            }
        };

        let outcome = if item.final_path.exists() {
            tracing::debug!(global, path = %item.final_path.display(), "skip (exists)");
            ItemOutcome::Skipped
        } else {
            match self.fetch_and_convert(&item) {
                Ok(bytes) => {
                    if !self.options.keep_source {
                        remove_quietly(&item.intermediate_path);
                    }
                    tracing::info!(
                        global,
                        group = item.position.group,
                        offset = item.position.offset,
                        bytes,
                        "converted"
                    );
                    ItemOutcome::Done { bytes }
                }
                Err(e) => {
                    remove_quietly(&item.intermediate_path);
                    remove_quietly(&item.final_path);
                    tracing::warn!(global, "item failed: {:#}", e);
                    ItemOutcome::Failed(format!("{:#}", e))
                }
            }
        };

        ItemReport {
            global,
            position: Some(item.position),
            final_path: Some(item.final_path),
            outcome,
        }
    }

    fn fetch_and_convert(&self, item: &WorkItem) -> Result<u64> {
        if let Some(dir) = item.final_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create directory {}", dir.display()))?;
        }

        let bytes = run_with_retry(&self.options.retry, || {
            self.fetcher.fetch(&item.source_url, &item.intermediate_path)
        })
        .with_context(|| {
            format!(
                "failed after {} attempts: {}",
                self.options.retry.max_attempts, item.source_url
            )
        })?;

        self.transcoder
            .convert(&item.intermediate_path, &item.final_path, &self.options.format)
            .with_context(|| format!("convert {}", item.intermediate_path.display()))?;

        Ok(bytes)
    }
}
