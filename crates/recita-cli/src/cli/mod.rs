//! CLI for recita: fetch, check and migrate the verse audio tree.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use recita_core::config::{self, RecitaConfig};
use std::fmt;
use std::path::PathBuf;

use commands::{run_check, run_fetch, run_migrate};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "recita")]
#[command(about = "recita: fetch verse recitations, convert them to raw PCM and maintain the artifact tree", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download and convert a range of verses. Existing artifacts are skipped.
    Fetch(FetchArgs),

    /// Report size and duration of every artifact, optionally decoding each one.
    Check(CheckArgs),

    /// Rename artifacts from a legacy filename prefix to the current one.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// First global verse index (1-based, inclusive).
    #[arg(long, default_value = "1", value_name = "N")]
    pub start: u32,
    /// Last global verse index (inclusive). Defaults to the last verse.
    #[arg(long, value_name = "N")]
    pub end: Option<u32>,
    /// Process at most N verses from --start (0 = no limit).
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,
    /// Worker threads.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
    /// Keep the downloaded recording next to the converted artifact.
    #[arg(long)]
    pub keep_source: bool,
    /// Output sample rate in Hz.
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,
    /// Sleep between submissions, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub sleep_ms: Option<u64>,
    /// Artifact root directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

impl FetchArgs {
    /// Overlays explicit flags on the loaded config.
    pub fn apply(&self, cfg: &mut RecitaConfig) {
        if let Some(workers) = self.workers {
            cfg.workers = workers;
        }
        if self.keep_source {
            cfg.keep_source = true;
        }
        if let Some(rate) = self.sample_rate {
            cfg.format.sample_rate = rate;
        }
        if let Some(ms) = self.sleep_ms {
            cfg.sleep_ms = ms;
        }
        if let Some(root) = &self.root {
            cfg.root = root.clone();
        }
    }
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Do not list artifacts smaller than this many bytes.
    #[arg(long, default_value = "1", value_name = "BYTES")]
    pub min_bytes: u64,
    /// Sample rate the artifacts were written with, in Hz.
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,
    /// Decode every artifact with the transcoder.
    #[arg(long)]
    pub probe: bool,
    /// Artifact root directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

impl CheckArgs {
    pub fn apply(&self, cfg: &mut RecitaConfig) {
        if let Some(rate) = self.sample_rate {
            cfg.format.sample_rate = rate;
        }
        if let Some(root) = &self.root {
            cfg.root = root.clone();
        }
    }
}

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Print the plan and exit without renaming anything.
    #[arg(long)]
    pub dry_run: bool,
    /// Apply without asking for confirmation.
    #[arg(long, short = 'y')]
    pub yes: bool,
    /// Legacy filename prefix (default from config, `ayah_`).
    #[arg(long, value_name = "PREFIX")]
    pub from: Option<String>,
    /// New filename prefix (default: the layout's item prefix).
    #[arg(long, value_name = "PREFIX")]
    pub to: Option<String>,
    /// Artifact root directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// How a command finished; mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// At least one item failed to convert, probe or rename.
    ItemFailures,
    /// The operator declined the confirmation prompt.
    Declined,
}

impl CommandStatus {
    /// Exit code for errors raised before any work (usage, bad range, config, missing root).
    pub const INVALID_INPUT: i32 = 1;
    /// Exit code for errors that stop a run after it started touching the artifact tree.
    pub const ABORTED: i32 = 4;

    pub fn code(self) -> i32 {
        match self {
            CommandStatus::Success => 0,
            CommandStatus::ItemFailures => 2,
            CommandStatus::Declined => 3,
        }
    }
}

/// Context marking an error raised after a command started working on the
/// artifact tree (I/O, task failures), as opposed to rejected input.
#[derive(Debug)]
pub struct RunAborted;

impl fmt::Display for RunAborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("run aborted")
    }
}

/// Exit code for a command error: [`CommandStatus::ABORTED`] when the error
/// carries [`RunAborted`], otherwise [`CommandStatus::INVALID_INPUT`].
pub fn error_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<RunAborted>().is_some() {
        CommandStatus::ABORTED
    } else {
        CommandStatus::INVALID_INPUT
    }
}

/// Exit code for a failed parse. Help and version output are not errors;
/// every usage error counts as invalid input.
pub fn usage_error_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        CommandStatus::INVALID_INPUT
    } else {
        0
    }
}

impl Cli {
    /// Parses the process arguments. On failure the message is printed and
    /// the exit code is returned instead of letting clap exit with its own.
    pub fn parse_from_env() -> Result<Cli, i32> {
        Cli::try_parse().map_err(|err| {
            let code = usage_error_code(&err);
            if code == 0 {
                err.exit();
            }
            let _ = err.print();
            code
        })
    }

    pub async fn run(self) -> Result<CommandStatus> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Fetch(args) => run_fetch(cfg, &args).await,
            CliCommand::Check(args) => run_check(cfg, &args),
            CliCommand::Migrate(args) => run_migrate(cfg, &args),
        }
    }
}

#[cfg(test)]
mod tests;
