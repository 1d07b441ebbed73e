//! `recita migrate` – rename legacy-prefixed artifacts, with dry-run and confirmation.

use anyhow::{bail, Context, Result};
use recita_core::config::RecitaConfig;
use recita_core::migrate::{apply_renames, plan_renames, RenameOutcome};
use std::io::{self, BufRead, Write};

use crate::cli::{CommandStatus, MigrateArgs, RunAborted};

pub fn run_migrate(cfg: RecitaConfig, args: &MigrateArgs) -> Result<CommandStatus> {
    migrate_with_input(cfg, args, &mut io::stdin().lock())
}

fn migrate_with_input<R: BufRead>(
    cfg: RecitaConfig,
    args: &MigrateArgs,
    input: &mut R,
) -> Result<CommandStatus> {
    let root = args.root.clone().unwrap_or(cfg.root);
    let from = args.from.as_deref().unwrap_or(&cfg.migrate.legacy_prefix);
    let to = args.to.as_deref().unwrap_or(&cfg.layout.item_prefix);
    if from.is_empty() || to.is_empty() {
        bail!("rename prefixes must not be empty");
    }

    let plans = plan_renames(&root, from, to).context(RunAborted)?;
    if plans.is_empty() {
        println!("Nothing to migrate under {}.", root.display());
        return Ok(CommandStatus::Success);
    }

    println!("Planned renames ({}):", plans.len());
    for plan in &plans {
        println!("  {} -> {}", plan.from.display(), plan.to.display());
    }
    if args.dry_run {
        println!("Dry run: no files were renamed.");
        return Ok(CommandStatus::Success);
    }
    if !args.yes && !confirm("Apply these renames? [y/N] ", input)? {
        println!("Aborted.");
        return Ok(CommandStatus::Declined);
    }

    let summary = apply_renames(&plans, |plan, outcome| match outcome {
        RenameOutcome::Renamed => {
            println!("Renamed {} -> {}", plan.from.display(), plan.to.display())
        }
        RenameOutcome::SkippedExists => println!(
            "Skipping {}: {} already exists",
            plan.from.display(),
            plan.to.display()
        ),
        RenameOutcome::Failed(reason) => {
            eprintln!("Failed to rename {}: {}", plan.from.display(), reason)
        }
    });
    println!(
        "Migration complete. Renamed: {}, Skipped: {}, Failed: {}",
        summary.renamed, summary.skipped, summary.failed
    );

    Ok(if summary.is_success() {
        CommandStatus::Success
    } else {
        CommandStatus::ItemFailures
    })
}

fn confirm<R: BufRead>(prompt: &str, input: &mut R) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("read confirmation")?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
