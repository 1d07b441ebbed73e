//! Tests for check and migrate subcommands.

use super::parse;
use crate::cli::commands::run_check;
use crate::cli::CliCommand;
use recita_core::config::RecitaConfig;
use std::path::Path;

#[test]
fn cli_parse_check_defaults() {
    match parse(&["recita", "check"]) {
        CliCommand::Check(args) => {
            assert_eq!(args.min_bytes, 1);
            assert!(args.sample_rate.is_none());
            assert!(!args.probe);
            assert!(args.root.is_none());
        }
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_check_flags() {
    match parse(&[
        "recita",
        "check",
        "--min-bytes",
        "0",
        "--sample-rate",
        "44100",
        "--probe",
        "--root",
        "assets",
    ]) {
        CliCommand::Check(args) => {
            assert_eq!(args.min_bytes, 0);
            assert_eq!(args.sample_rate, Some(44_100));
            assert!(args.probe);
            assert_eq!(args.root.as_deref(), Some(Path::new("assets")));
        }
        _ => panic!("expected Check with flags"),
    }
}

#[test]
fn check_missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");
    let CliCommand::Check(args) = parse(&["recita", "check", "--root", missing.to_str().unwrap()])
    else {
        panic!("expected Check");
    };
    assert!(run_check(RecitaConfig::default(), &args).is_err());
}

#[test]
fn check_lists_without_probe() {
    let dir = tempfile::tempdir().unwrap();
    let group = dir.path().join("group_001");
    std::fs::create_dir_all(&group).unwrap();
    std::fs::write(group.join("item_001.pcm"), vec![0u8; 64]).unwrap();
    let CliCommand::Check(args) = parse(&["recita", "check", "--root", dir.path().to_str().unwrap()])
    else {
        panic!("expected Check");
    };
    assert_eq!(
        run_check(RecitaConfig::default(), &args).unwrap(),
        crate::cli::CommandStatus::Success
    );
}

#[test]
fn cli_parse_migrate_defaults() {
    match parse(&["recita", "migrate"]) {
        CliCommand::Migrate(args) => {
            assert!(!args.dry_run);
            assert!(!args.yes);
            assert!(args.from.is_none());
            assert!(args.to.is_none());
            assert!(args.root.is_none());
        }
        _ => panic!("expected Migrate"),
    }
}

#[test]
fn cli_parse_migrate_flags() {
    match parse(&[
        "recita", "migrate", "--dry-run", "-y", "--from", "old_", "--to", "new_", "--root", "x",
    ]) {
        CliCommand::Migrate(args) => {
            assert!(args.dry_run);
            assert!(args.yes);
            assert_eq!(args.from.as_deref(), Some("old_"));
            assert_eq!(args.to.as_deref(), Some("new_"));
            assert_eq!(args.root.as_deref(), Some(Path::new("x")));
        }
        _ => panic!("expected Migrate with flags"),
    }
}

#[test]
fn cli_parse_unknown_subcommand_fails() {
    use clap::Parser;
    assert!(crate::cli::Cli::try_parse_from(["recita", "status"]).is_err());
}
