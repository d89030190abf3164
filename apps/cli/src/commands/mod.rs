//! Command implementations

pub mod cluster;
pub mod clusters;

use std::time::Duration;

use strato_client::clusters_mgmt::Cluster;
use strato_client::{Envelope, Response};
use strato_resilience::ExecutionContext;

/// Parse durations such as `30s`, `5m` or `1h 30m`.
pub(crate) fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| e.to_string())
}

/// Context bounded by `timeout` and cancelled on Ctrl-C.
pub(crate) fn interruptible(timeout: Duration) -> ExecutionContext {
    let ctx = ExecutionContext::with_timeout(timeout);
    let canceller = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, stopping");
            canceller.cancel();
        }
    });
    ctx
}

/// Body of a response, or the error the service answered with.
pub(crate) fn expect_body<B>(response: Response<B>, what: &str) -> anyhow::Result<B> {
    response
        .into_result()
        .map_err(|e| anyhow::anyhow!("failed to {what}: {e}"))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn cluster_row(cluster: &Envelope<Cluster>) -> String {
    format!(
        "{:<34} {:<24} {:<14} {:<12} {}",
        cluster.id().unwrap_or("-"),
        cluster.name.as_deref().unwrap_or("-"),
        cluster.state.map_or("-".into(), |s| s.to_string()),
        cluster
            .region
            .as_ref()
            .and_then(|r| r.id())
            .unwrap_or("-"),
        cluster
            .version
            .as_ref()
            .and_then(|v| v.raw_id.as_deref().or(v.id()))
            .unwrap_or("-"),
    )
}

pub(crate) fn cluster_header() -> String {
    format!(
        "{:<34} {:<24} {:<14} {:<12} {}",
        "ID", "NAME", "STATE", "REGION", "VERSION"
    )
}
