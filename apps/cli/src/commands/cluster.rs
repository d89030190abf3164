//! Single cluster commands

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Subcommand};
use strato_client::Connection;
use strato_client::clusters_mgmt::{ClusterState, ClusterStatus};
use strato_resilience::PollError;

use super::{expect_body, interruptible, parse_duration, print_json};

#[derive(Subcommand, Debug)]
pub enum ClusterCommands {
    /// Show cluster details as JSON
    Get(IdArgs),
    /// Show provisioning status
    Status(IdArgs),
    /// Wait until the cluster reaches a state
    Wait(WaitArgs),
    /// Delete a cluster
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Cluster id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct PollArgs {
    /// Time between checks
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub interval: Duration,
    /// Give up after this long
    #[arg(long, default_value = "1h", value_parser = parse_duration)]
    pub timeout: Duration,
}

#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Cluster id
    pub id: String,
    /// State to wait for
    #[arg(long, default_value = "ready")]
    pub state: ClusterState,
    #[command(flatten)]
    pub poll: PollArgs,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Cluster id
    pub id: String,
    /// Wait until the cluster is gone
    #[arg(long)]
    pub wait: bool,
    #[command(flatten)]
    pub poll: PollArgs,
}

pub async fn run(cmd: ClusterCommands, conn: &Connection) -> anyhow::Result<()> {
    match cmd {
        ClusterCommands::Get(args) => get(conn, &args.id).await,
        ClusterCommands::Status(args) => status(conn, &args.id).await,
        ClusterCommands::Wait(args) => wait(conn, args).await,
        ClusterCommands::Delete(args) => delete(conn, args).await,
    }
}

async fn get(conn: &Connection, id: &str) -> anyhow::Result<()> {
    let response = conn
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster(id)
        .get()
        .send()
        .await?;
    let cluster = expect_body(response, &format!("get cluster '{id}'"))?;
    print_json(&cluster)
}

fn print_status(id: &str, status: &ClusterStatus) {
    println!(
        "{id}: {}",
        status.state.map_or("unknown".into(), |s| s.to_string())
    );
    if let Some(description) = &status.description {
        println!("  {description}");
    }
    if let Some(message) = &status.provision_error_message {
        println!(
            "  error {}: {message}",
            status.provision_error_code.as_deref().unwrap_or("-")
        );
    }
}

async fn status(conn: &Connection, id: &str) -> anyhow::Result<()> {
    let response = conn
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster(id)
        .status()
        .get()
        .send()
        .await?;
    let status = expect_body(response, &format!("get status of cluster '{id}'"))?;
    print_status(id, &status);
    Ok(())
}

async fn wait(conn: &Connection, args: WaitArgs) -> anyhow::Result<()> {
    let target = args.state;
    let ctx = interruptible(args.poll.timeout);
    tracing::info!(id = %args.id, state = %target, "waiting for cluster");

    let response = conn
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster(&args.id)
        .status()
        .poll()
        .interval(args.poll.interval)
        .status(200)
        .predicate(move |response| {
            response
                .body()
                .and_then(|status| status.state)
                .is_some_and(|state| state == target || state == ClusterState::Error)
        })
        .start(&ctx)
        .await
        .map_err(|e| describe(e, &args.id))?;

    let status = response.body().context("status response has no body")?;
    print_status(&args.id, status);
    if target != ClusterState::Error && status.state == Some(ClusterState::Error) {
        anyhow::bail!("cluster '{}' failed before reaching {target}", args.id);
    }
    Ok(())
}

async fn delete(conn: &Connection, args: DeleteArgs) -> anyhow::Result<()> {
    let cluster = conn.clusters_mgmt().v1().clusters().cluster(&args.id);
    let response = cluster.delete().send().await?;
    expect_body(response, &format!("delete cluster '{}'", args.id))?;
    println!("deletion of cluster '{}' requested", args.id);

    if !args.wait {
        return Ok(());
    }

    let ctx = interruptible(args.poll.timeout);
    let gone = cluster
        .poll()
        .interval(args.poll.interval)
        .status(404)
        .start(&ctx)
        .await
        .map_err(|e| describe(e, &args.id))?;
    println!(
        "cluster '{}' deleted after {} checks",
        args.id,
        gone.attempts()
    );
    Ok(())
}

fn describe(err: PollError<strato_client::Error>, id: &str) -> anyhow::Error {
    if err.is_deadline_exceeded() {
        anyhow::anyhow!("timed out waiting for cluster '{id}'")
    } else {
        anyhow::Error::new(err).context(format!("stopped waiting for cluster '{id}'"))
    }
}
