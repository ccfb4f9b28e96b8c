//! CLI parse tests.

use super::{AppLookup, Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_fetch() {
    match parse(&["plugfetch", "fetch", "70"]) {
        CliCommand::Fetch { id, quiet } => {
            assert_eq!(id, "70");
            assert!(!quiet);
        }
        _ => panic!("expected Fetch"),
    }
    match parse(&["plugfetch", "fetch", "-q", "70"]) {
        CliCommand::Fetch { quiet, .. } => assert!(quiet),
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_installed_and_augment() {
    match parse(&["plugfetch", "installed", "10"]) {
        CliCommand::Installed { id } => assert_eq!(id, "10"),
        _ => panic!("expected Installed"),
    }
    match parse(&["plugfetch", "augment", "10"]) {
        CliCommand::Augment { id } => assert_eq!(id, "10"),
        _ => panic!("expected Augment"),
    }
}

#[test]
fn cli_parse_app_defaults_to_info() {
    match parse(&["plugfetch", "app", "70"]) {
        CliCommand::App {
            id,
            lookup,
            currency,
        } => {
            assert_eq!(id, "70");
            assert_eq!(lookup, AppLookup::Info);
            assert!(currency.is_none());
        }
        _ => panic!("expected App"),
    }
}

#[test]
fn cli_parse_app_price() {
    match parse(&["plugfetch", "app", "70", "--lookup", "price", "--currency", "EUR"]) {
        CliCommand::App {
            lookup, currency, ..
        } => {
            assert_eq!(lookup, AppLookup::Price);
            assert_eq!(currency.as_deref(), Some("EUR"));
        }
        _ => panic!("expected App"),
    }
}

#[test]
fn cli_parse_bridge() {
    assert!(matches!(parse(&["plugfetch", "bridge"]), CliCommand::Bridge));
}

#[test]
fn cli_parse_checksum() {
    match parse(&["plugfetch", "checksum", "/tmp/70.zip", "--expect", "abc"]) {
        CliCommand::Checksum { path, expect } => {
            assert_eq!(path, PathBuf::from("/tmp/70.zip"));
            assert_eq!(expect.as_deref(), Some("abc"));
        }
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_rejects_missing_id_and_unknown_lookup() {
    assert!(Cli::try_parse_from(["plugfetch", "fetch"]).is_err());
    assert!(Cli::try_parse_from(["plugfetch", "app", "1", "--lookup", "reviews"]).is_err());
}
