//! Resumable fetch/convert pipeline.
//!
//! Each global index is an independent unit of work:
//! catalog lookup → existence check → fetch (with retry) → transcode → cleanup.
//! The only persisted state is the final artifact itself; re-running over a
//! partially processed range only does work for missing artifacts.

mod item;
mod pool;
mod range;
mod summary;

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::Catalog;
use crate::config::RecitaConfig;
use crate::fetch::Fetch;
use crate::layout::ArtifactLayout;
use crate::retry::RetryPolicy;
use crate::transcode::{PcmFormat, Transcode};

pub use item::WorkItem;
pub use range::{IndexRange, RangeError};
pub use summary::{ItemOutcome, ItemReport, RunSummary};

/// Per-run knobs.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub workers: usize,
    /// Keep the fetched source next to the final artifact instead of a scratch file.
    pub keep_source: bool,
    /// Sleep between successive submissions (not completions).
    pub submit_delay: Duration,
    pub format: PcmFormat,
    pub retry: RetryPolicy,
}

impl PipelineOptions {
    pub fn from_config(cfg: &RecitaConfig) -> Self {
        Self {
            workers: cfg.workers,
            keep_source: cfg.keep_source,
            submit_delay: Duration::from_millis(cfg.sleep_ms),
            format: cfg.format,
            retry: cfg.retry_policy(),
        }
    }
}

pub struct Pipeline {
    catalog: Catalog,
    layout: ArtifactLayout,
    fetcher: Arc<dyn Fetch>,
    transcoder: Arc<dyn Transcode>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        catalog: Catalog,
        layout: ArtifactLayout,
        fetcher: Arc<dyn Fetch>,
        transcoder: Arc<dyn Transcode>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            catalog,
            layout,
            fetcher,
            transcoder,
            options,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }
}
