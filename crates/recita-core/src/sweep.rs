//! Read-only validation of artifacts already on disk.
//!
//! Reports each artifact's size and the duration implied by the configured
//! [`PcmFormat`], optionally confirming it decodes with the transcoder.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::transcode::{PcmFormat, Transcode};

#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Artifacts smaller than this are counted but not listed.
    pub min_bytes: u64,
    /// Extension of artifacts to inspect (without the dot).
    pub extension: String,
    pub format: PcmFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    NotRun,
    Ok,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SweepEntry {
    pub path: PathBuf,
    pub bytes: u64,
    pub duration_secs: f64,
    pub probe: ProbeStatus,
}

#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Listed artifacts (at or above the size floor).
    pub scanned: usize,
    pub below_floor: usize,
    pub probe_failures: usize,
    /// Paths that could not be read, with the reason.
    pub unreadable: Vec<(PathBuf, String)>,
}

impl SweepReport {
    pub fn is_success(&self) -> bool {
        self.probe_failures == 0
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Walks `root` recursively in file-name order and calls `on_entry` for each
/// listed artifact. Probing runs only when `prober` is `Some`.
pub fn sweep<F>(
    root: &Path,
    opts: &SweepOptions,
    prober: Option<&dyn Transcode>,
    mut on_entry: F,
) -> Result<SweepReport>
where
    F: FnMut(&SweepEntry),
{
    if !root.is_dir() {
        bail!("artifact root not found: {}", root.display());
    }

    let mut report = SweepReport::default();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                tracing::warn!(path = %path.display(), "walk error: {}", e);
                report.unreadable.push((path, e.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_extension(entry.path(), &opts.extension) {
            continue;
        }

        let bytes = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), "stat error: {}", e);
                report.unreadable.push((entry.path().to_path_buf(), e.to_string()));
                continue;
            }
        };
        if bytes < opts.min_bytes {
            report.below_floor += 1;
            continue;
        }

        let probe = match prober {
            None => ProbeStatus::NotRun,
            Some(t) => match t.probe(entry.path(), &opts.format) {
                Ok(()) => ProbeStatus::Ok,
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), "probe failed: {}", e);
                    report.probe_failures += 1;
                    ProbeStatus::Failed(e.to_string())
                }
            },
        };

        report.scanned += 1;
        on_entry(&SweepEntry {
            path: entry.into_path(),
            bytes,
            duration_secs: opts.format.duration_secs(bytes),
            probe,
        });
    }
    Ok(report)
}
