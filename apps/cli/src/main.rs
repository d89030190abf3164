//! Strato CLI
//!
//! Manage clusters of the Strato cluster management service.

use anyhow::Context;
use clap::Parser;

use strato_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    strato_log::init(&config.log).context("failed to initialize logging")?;

    cli.run(&config).await
}
