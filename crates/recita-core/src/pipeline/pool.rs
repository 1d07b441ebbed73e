//! Bounded concurrency over blocking fetch/convert calls.
//!
//! Keeps up to `workers` items in flight on tokio's blocking pool; when one
//! finishes, the next index is submitted. Successive submissions are spaced
//! by `submit_delay`. Reports are consumed in completion order.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

use super::summary::{ItemReport, RunSummary};
use super::Pipeline;

impl Pipeline {
    /// Processes every index in `indices` and returns the aggregated summary.
    /// `on_report` is called for each finished item with the summary so far
    /// (already including that item).
    pub async fn run<F>(self: Arc<Self>, indices: &[u32], mut on_report: F) -> Result<RunSummary>
    where
        F: FnMut(&ItemReport, &RunSummary),
    {
        let started = Instant::now();
        let mut summary = RunSummary::default();
        let max_concurrent = self.options.workers.max(1);
        let delay = self.options.submit_delay;

        let mut pending = indices.iter().copied();
        let mut last_submit: Option<tokio::time::Instant> = None;
        let mut join_set = JoinSet::new();

        loop {
            while join_set.len() < max_concurrent {
                let Some(global) = pending.next() else {
                    break;
                };
                if let Some(last) = last_submit.filter(|_| !delay.is_zero()) {
                    tokio::time::sleep_until(last + delay).await;
                }
                last_submit = Some(tokio::time::Instant::now());
                let pipeline = Arc::clone(&self);
                join_set.spawn_blocking(move || pipeline.process_item(global));
            }

            let Some(res) = join_set.join_next().await else {
                break;
            };
            let report = res.context("item task join")?;
            summary.record(&report);
            on_report(&report, &summary);
        }

        summary.elapsed = started.elapsed();
        tracing::info!(
            done = summary.done,
            skipped = summary.skipped,
            failed = summary.failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "run finished"
        );
        Ok(summary)
    }
}
