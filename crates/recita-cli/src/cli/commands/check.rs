//! `recita check` – list artifact sizes and durations, optionally decoding each one.

use anyhow::{Context, Result};
use recita_core::config::RecitaConfig;
use recita_core::sweep::{sweep, ProbeStatus, SweepOptions};
use recita_core::transcode::{Ffmpeg, Transcode};

use crate::cli::{CheckArgs, CommandStatus};

pub fn run_check(mut cfg: RecitaConfig, args: &CheckArgs) -> Result<CommandStatus> {
    args.apply(&mut cfg);
    cfg.format.validate().context("invalid format")?;

    let opts = SweepOptions {
        min_bytes: args.min_bytes,
        extension: cfg.layout.extension.clone(),
        format: cfg.format,
    };
    let ffmpeg = Ffmpeg::from_config(&cfg.transcoder);
    let prober: Option<&dyn Transcode> = if args.probe {
        Some(&ffmpeg as &dyn Transcode)
    } else {
        None
    };

    let report = sweep(&cfg.root, &opts, prober, |entry| {
        let probe = match &entry.probe {
            ProbeStatus::NotRun => String::new(),
            ProbeStatus::Ok => "  ok".to_string(),
            ProbeStatus::Failed(reason) => format!("  DECODE FAILED ({reason})"),
        };
        println!(
            "{}  {} bytes  {:.2}s{}",
            entry.path.display(),
            entry.bytes,
            entry.duration_secs,
            probe
        );
    })?;

    for (path, reason) in &report.unreadable {
        eprintln!("Error reading {}: {}", path.display(), reason);
    }
    if report.below_floor > 0 {
        println!(
            "Skipped {} files below {} bytes",
            report.below_floor, args.min_bytes
        );
    }
    println!(
        "Scanned {} files; probe failures: {}",
        report.scanned, report.probe_failures
    );

    Ok(if report.is_success() {
        CommandStatus::Success
    } else {
        CommandStatus::ItemFailures
    })
}
