//! `recita fetch` – download and convert a verse range into the artifact tree.

use anyhow::{Context, Result};
use recita_core::catalog::Catalog;
use recita_core::config::RecitaConfig;
use recita_core::fetch::CurlFetcher;
use recita_core::layout::ArtifactLayout;
use recita_core::pipeline::{IndexRange, ItemOutcome, Pipeline, PipelineOptions};
use recita_core::transcode::Ffmpeg;
use std::fs;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::{CommandStatus, FetchArgs, RunAborted};

/// Print a progress line after this many new conversions.
const PROGRESS_EVERY: usize = 50;

pub async fn run_fetch(mut cfg: RecitaConfig, args: &FetchArgs) -> Result<CommandStatus> {
    args.apply(&mut cfg);
    cfg.validate().context("invalid configuration")?;

    let catalog = Catalog::verses().context("verse table is inconsistent")?;
    let range = IndexRange::new(
        args.start,
        args.end.unwrap_or(catalog.total()),
        args.limit,
        catalog.total(),
    )?;
    let layout = ArtifactLayout::from_config(&cfg)?;
    fs::create_dir_all(layout.root())
        .with_context(|| format!("create artifact root {}", layout.root().display()))
        .context(RunAborted)?;

    let pipeline = Arc::new(Pipeline::new(
        catalog,
        layout,
        Arc::new(CurlFetcher::default()),
        Arc::new(Ffmpeg::from_config(&cfg.transcoder)),
        PipelineOptions::from_config(&cfg),
    ));

    println!(
        "Processing {} items (global indices {}..{})",
        range.count(),
        range.start(),
        range.end()
    );
    tracing::info!(
        start = range.start(),
        end = range.end(),
        workers = cfg.workers,
        root = %cfg.root.display(),
        "fetch started"
    );

    let started = Instant::now();
    let summary = pipeline.run(&range.indices(), |report, so_far| match &report.outcome {
        ItemOutcome::Failed(reason) => eprintln!("[{}] error: {}", report.global, reason),
        ItemOutcome::Done { .. } if so_far.done % PROGRESS_EVERY == 0 => println!(
            "  {} converted, {} skipped, {} errors ({:.1}s)",
            so_far.done,
            so_far.skipped,
            so_far.failed,
            started.elapsed().as_secs_f64()
        ),
        _ => {}
    })
    .await
    .context(RunAborted)?;

    println!(
        "Done. New: {}, Skipped: {}, Errors: {}, Time: {:.1}s",
        summary.done,
        summary.skipped,
        summary.failed,
        summary.elapsed.as_secs_f64()
    );
    Ok(if summary.is_success() {
        CommandStatus::Success
    } else {
        CommandStatus::ItemFailures
    })
}
