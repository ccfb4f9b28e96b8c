//! CLI for plugfetch.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use plugfetch_core::config;
use plugfetch_core::service::Service;
use std::path::PathBuf;

use commands::{run_app, run_augment, run_bridge, run_checksum, run_fetch, run_installed};

#[derive(Debug, Parser)]
#[command(name = "plugfetch")]
#[command(about = "plugfetch: fetch, patch and install plugin payloads from mirror archives", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Catalog endpoint queried by `plugfetch app`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AppLookup {
    Info,
    Price,
    Achievements,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Acquire and install the payload for an app, showing progress until it finishes.
    Fetch {
        /// App id (positive integer).
        id: String,
        /// Only print the final result.
        #[arg(long, short)]
        quiet: bool,
    },

    /// Report whether a payload for the app is installed (active or disabled).
    Installed {
        id: String,
    },

    /// Append missing DLC lines for the app to the shared config document.
    Augment {
        id: String,
    },

    /// Query the catalog API for an app.
    App {
        id: String,
        #[arg(long, value_enum, default_value = "info")]
        lookup: AppLookup,
        /// Currency code for `--lookup price`.
        #[arg(long)]
        currency: Option<String>,
    },

    /// Serve JSON requests line by line on stdin/stdout.
    Bridge,

    /// Compute SHA-256 of a file (e.g. a staged archive).
    Checksum {
        path: PathBuf,
        /// Fail unless the digest equals this hex string.
        #[arg(long, value_name = "HEX")]
        expect: Option<String>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            // Needs no install root.
            CliCommand::Checksum { path, expect } => run_checksum(&path, expect.as_deref()),
            command => {
                let svc = Service::open(&cfg)?;
                let result = command.dispatch(&svc).await;
                svc.close();
                result
            }
        }
    }

    async fn dispatch(self, svc: &Service) -> Result<()> {
        match self {
            CliCommand::Fetch { id, quiet } => run_fetch(svc, &id, quiet).await,
            CliCommand::Installed { id } => run_installed(svc, &id),
            CliCommand::Augment { id } => run_augment(svc, &id).await,
            CliCommand::App {
                id,
                lookup,
                currency,
            } => run_app(svc, &id, lookup, currency.as_deref()).await,
            CliCommand::Bridge => run_bridge(svc).await,
            CliCommand::Checksum { path, expect } => run_checksum(&path, expect.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests;
