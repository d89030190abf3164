//! Strato CLI library

pub mod commands;
pub mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use strato_client::Connection;

use crate::config::{CliConfig, LogOverrides, Overrides};

/// Strato - manage clusters from the command line
#[derive(Parser, Debug)]
#[command(name = "strato")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Config file (default: ~/.config/strato/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Service URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Bearer token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Log filter directives, e.g. "debug" or "strato_client=trace"
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Log format: pretty, compact or json
    #[arg(long, global = true, value_name = "FORMAT")]
    pub log_format: Option<strato_log::Format>,
}

impl GlobalArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            token: self.token.clone(),
            log: LogOverrides {
                level: self.log_level.clone(),
                format: self.log_format,
            },
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Operate on the cluster collection
    #[command(subcommand)]
    Clusters(commands::clusters::ClustersCommands),
    /// Operate on a single cluster
    #[command(subcommand)]
    Cluster(commands::cluster::ClusterCommands),
}

impl Cli {
    /// Load the layered configuration for this invocation.
    pub fn load_config(&self) -> anyhow::Result<CliConfig> {
        config::load(self.global.config.as_deref(), &self.global.overrides())
    }

    /// Run the CLI command
    pub async fn run(self, config: &CliConfig) -> anyhow::Result<()> {
        let conn = connect(config)?;
        match self.command {
            Commands::Clusters(cmd) => commands::clusters::run(cmd, &conn).await,
            Commands::Cluster(cmd) => commands::cluster::run(cmd, &conn).await,
        }
    }
}

fn connect(config: &CliConfig) -> anyhow::Result<Connection> {
    if config.connection.url.is_none() {
        anyhow::bail!(
            "no service URL configured; pass --url, set STRATO_URL or add `url` to the config file"
        );
    }
    Connection::builder()
        .from_config(&config.connection)
        .build()
        .context("failed to create connection")
}
