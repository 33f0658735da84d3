//! Command-line interface for publishing folders of geographic datasets.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod adapters;
mod config;
mod error;
mod logging;
mod publish;

pub use error::CliError;

use config::PublishArgs;

/// Run the gispub CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, or when
/// generation, deployment or the import run fails.
pub async fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Publish(args) => publish::run_publish(args).await,
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "gispub",
    about = "Turn folders of geographic datasets into deployed GIS products",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate, deploy and populate a GIS product from a dataset folder.
    Publish(PublishArgs),
}

#[cfg(test)]
mod tests;
